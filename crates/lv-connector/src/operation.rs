//! Attribute and change types
//!
//! Types exchanged with the host: attribute sets on records and the
//! attribute changes carried by account updates.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Named attribute values of an account or entitlement record.
///
/// Serializes as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeSet {
    #[serde(flatten)]
    values: HashMap<String, AttributeValue>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.values.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    /// String value of `name`, if it holds a single string.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.values.get(name)?.as_string()
    }

    /// String values of `name`; a single string yields one element.
    pub fn get_strings(&self, name: &str) -> Option<Vec<&str>> {
        self.values.get(name).map(AttributeValue::as_strings)
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        self.values.remove(name)
    }

    /// JSON object of the non-null attributes, as sent in a backend write.
    pub fn to_json_object(&self) -> serde_json::Map<String, Value> {
        self.values
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect()
    }
}

/// An attribute value as it travels between host and backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    #[default]
    Null,
    String(String),
    Integer(i64),
    Boolean(bool),
    Float(f64),
    /// Multi-valued attribute, e.g. `groups`.
    Array(Vec<AttributeValue>),
    Object(serde_json::Map<String, Value>),
}

impl AttributeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    pub fn as_string(&self) -> Option<&str> {
        if let AttributeValue::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// String elements of an array, or the value itself when it is a string.
    /// Non-string elements are skipped.
    pub fn as_strings(&self) -> Vec<&str> {
        match self {
            AttributeValue::String(s) => vec![s.as_str()],
            AttributeValue::Array(items) => items.iter().filter_map(Self::as_string).collect(),
            _ => Vec::new(),
        }
    }

    /// Render a scalar as the identifier string the backend expects.
    ///
    /// Integers and booleans are stringified; arrays, objects and null are not
    /// identifiers.
    pub fn to_id_string(&self) -> Option<String> {
        match self {
            AttributeValue::String(s) => Some(s.clone()),
            AttributeValue::Integer(i) => Some(i.to_string()),
            AttributeValue::Float(f) => Some(f.to_string()),
            AttributeValue::Boolean(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<&Value> for AttributeValue {
    fn from(value: &Value) -> Self {
        AttributeValue::deserialize(value).unwrap_or_default()
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        AttributeValue::Integer(i)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Boolean(b)
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttributeValue::Null, Into::into)
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
    fn from(vec: Vec<T>) -> Self {
        AttributeValue::Array(vec.into_iter().map(Into::into).collect())
    }
}

/// Kind of change the host requests on an account attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeChangeOp {
    Add,
    Remove,
    /// Replace a single-valued attribute.
    Set,
}

impl std::fmt::Display for AttributeChangeOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AttributeChangeOp::Add => "Add",
            AttributeChangeOp::Remove => "Remove",
            AttributeChangeOp::Set => "Set",
        };
        f.write_str(name)
    }
}

/// One attribute change in an account update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub op: AttributeChangeOp,
    pub attribute: String,
    #[serde(default)]
    pub value: AttributeValue,
}

impl AttributeChange {
    pub fn new(
        op: AttributeChangeOp,
        attribute: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        Self {
            op,
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Flatten the change value: arrays yield their elements, a scalar yields
    /// itself and null yields nothing.
    pub fn values(&self) -> Vec<&AttributeValue> {
        match &self.value {
            AttributeValue::Null => Vec::new(),
            AttributeValue::Array(arr) => arr.iter().filter(|v| !v.is_null()).collect(),
            other => vec![other],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_set() {
        let attrs = AttributeSet::new()
            .with("email_address", "jdoe@example.com")
            .with("status", "A");

        assert_eq!(attrs.get_string("email_address"), Some("jdoe@example.com"));
        assert_eq!(attrs.get_strings("status"), Some(vec!["A"]));
        assert!(!attrs.has("nonexistent"));
    }

    #[test]
    fn test_multi_valued_attribute() {
        let attrs = AttributeSet::new().with("groups", vec!["10", "11"]);

        let groups = attrs.get_strings("groups").unwrap();
        assert_eq!(groups, vec!["10", "11"]);
        assert_eq!(attrs.get_string("groups"), None);
    }

    #[test]
    fn test_attribute_value_from_json() {
        assert_eq!(AttributeValue::from(&json!(7)), AttributeValue::Integer(7));
        assert_eq!(
            AttributeValue::from(&json!("x")),
            AttributeValue::String("x".to_string())
        );
        assert!(AttributeValue::from(&json!(null)).is_null());
        assert_eq!(AttributeValue::from(&json!(1.5)), AttributeValue::Float(1.5));
    }

    #[test]
    fn test_to_id_string() {
        assert_eq!(AttributeValue::Integer(42).to_id_string(), Some("42".to_string()));
        assert_eq!(
            AttributeValue::from("42").to_id_string(),
            Some("42".to_string())
        );
        assert_eq!(AttributeValue::Null.to_id_string(), None);
        assert_eq!(AttributeValue::from(vec!["1"]).to_id_string(), None);
    }

    #[test]
    fn test_to_json_object_drops_nulls() {
        let attrs = AttributeSet::new()
            .with("full_name", "Jane Doe")
            .with("groups", AttributeValue::Null);

        let obj = attrs.to_json_object();
        assert_eq!(obj.get("full_name"), Some(&json!("Jane Doe")));
        assert!(!obj.contains_key("groups"));
    }

    #[test]
    fn test_attribute_change_deserialize() {
        let change: AttributeChange = serde_json::from_value(json!({
            "op": "Add",
            "attribute": "groups",
            "value": ["3", "4"]
        }))
        .unwrap();

        assert_eq!(change.op, AttributeChangeOp::Add);
        assert_eq!(change.attribute, "groups");
        assert_eq!(change.values().len(), 2);
    }

    #[test]
    fn test_attribute_change_values_scalar_and_null() {
        let scalar = AttributeChange::new(AttributeChangeOp::Remove, "groups", "3");
        assert_eq!(scalar.values(), vec![&AttributeValue::from("3")]);

        let empty: AttributeChange = serde_json::from_value(json!({
            "op": "Remove",
            "attribute": "groups"
        }))
        .unwrap();
        assert!(empty.values().is_empty());
    }

    #[test]
    fn test_attribute_set_serialization_is_flat() {
        let attrs = AttributeSet::new().with("user_id", "7");
        let json = serde_json::to_value(&attrs).unwrap();
        assert_eq!(json, json!({ "user_id": "7" }));
    }
}
