//! Mapping from LandView rows to host records.

use serde_json::Value;

use lv_connector::error::{ConnectorError, ConnectorResult};
use lv_connector::operation::{AttributeSet, AttributeValue};
use lv_connector::record::{AccountRecord, EntitlementRecord};

/// `sys_user.status` value of a disabled account.
pub const STATUS_INACTIVE: &str = "I";

/// `sys_user.status` value of an active account.
pub const STATUS_ACTIVE: &str = "A";

/// Entitlement type reported for both groups and permissions.
pub const ENTITLEMENT_TYPE: &str = "group";

/// Read an identifier column. LandView returns ids as numbers, but strings
/// are accepted too.
pub fn id_field(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Collect an identifier column from relation rows, skipping rows without it.
pub fn ids_from_rows(rows: &[Value], column: &str) -> Vec<String> {
    rows.iter().filter_map(|row| id_field(row, column)).collect()
}

fn field(row: &Value, column: &str) -> AttributeValue {
    row.get(column).map_or(AttributeValue::Null, AttributeValue::from)
}

fn require_id(row: &Value, column: &str, table: &str) -> ConnectorResult<String> {
    id_field(row, column).ok_or_else(|| {
        ConnectorError::invalid_data(format!("{table} row has no {column}: {row}"))
    })
}

/// A `sys_user` row.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub identity: String,
    pub uuid: String,
    pub disabled: bool,
    pub attributes: AttributeSet,
}

impl Account {
    /// Build from a `sys_user` row.
    pub fn from_row(row: &Value) -> ConnectorResult<Self> {
        let identity = require_id(row, "user_id", "sys_user")?;
        let status = field(row, "status");
        let disabled = status.as_string() == Some(STATUS_INACTIVE);
        let user_name = field(row, "user_name");
        let uuid = user_name
            .as_string()
            .map_or_else(|| identity.clone(), str::to_string);

        let attributes = AttributeSet::new()
            .with("user_id", identity.clone())
            .with("status", status)
            .with("user_name", user_name)
            .with("full_name", field(row, "full_name"))
            .with("email_address", field(row, "email_address"))
            .with("groups", field(row, "groups"));

        Ok(Self {
            identity,
            uuid,
            disabled,
            attributes,
        })
    }

    /// Attach the account's group ids.
    #[must_use]
    pub fn with_groups(mut self, groups: Vec<String>) -> Self {
        self.attributes.set("groups", groups);
        self
    }

    /// Display name for log messages.
    pub fn full_name(&self) -> &str {
        self.attributes
            .get_string("full_name")
            .unwrap_or(self.uuid.as_str())
    }
}

impl From<Account> for AccountRecord {
    fn from(account: Account) -> Self {
        AccountRecord {
            identity: account.identity,
            uuid: account.uuid,
            disabled: account.disabled,
            locked: false,
            attributes: account.attributes,
        }
    }
}

/// A `sys_group` row.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub identity: String,
    pub uuid: String,
    pub attributes: AttributeSet,
}

impl Group {
    /// Build from a `sys_group` row.
    pub fn from_row(row: &Value) -> ConnectorResult<Self> {
        let identity = require_id(row, "group_id", "sys_group")?;
        let name = field(row, "group_name");
        let uuid = name
            .as_string()
            .map_or_else(|| identity.clone(), str::to_string);

        let attributes = AttributeSet::new()
            .with("id", identity.clone())
            .with("name", name)
            .with("description", field(row, "description"));

        Ok(Self {
            identity,
            uuid,
            attributes,
        })
    }

    /// Attach the ids of the permissions granted by this group.
    #[must_use]
    pub fn with_permissions(mut self, permissions: Vec<String>) -> Self {
        self.attributes.set("permissions", permissions);
        self
    }
}

impl From<Group> for EntitlementRecord {
    fn from(group: Group) -> Self {
        EntitlementRecord {
            identity: group.identity,
            uuid: group.uuid,
            entitlement_type: ENTITLEMENT_TYPE.to_string(),
            attributes: group.attributes,
        }
    }
}

/// A `sys_permission` row.
#[derive(Debug, Clone, PartialEq)]
pub struct Permission {
    pub identity: String,
    pub uuid: String,
    pub attributes: AttributeSet,
}

impl Permission {
    /// Build from a `sys_permission` row.
    pub fn from_row(row: &Value) -> ConnectorResult<Self> {
        let identity = require_id(row, "permission_id", "sys_permission")?;
        let name = field(row, "permission_name");
        let uuid = name
            .as_string()
            .map_or_else(|| identity.clone(), str::to_string);

        let attributes = AttributeSet::new()
            .with("id", identity.clone())
            .with("name", name)
            .with("description", field(row, "description"))
            .with("groups", field(row, "groups"));

        Ok(Self {
            identity,
            uuid,
            attributes,
        })
    }

    /// Attach the ids of the groups granting this permission.
    #[must_use]
    pub fn with_groups(mut self, groups: Vec<String>) -> Self {
        self.attributes.set("groups", groups);
        self
    }
}

impl From<Permission> for EntitlementRecord {
    fn from(permission: Permission) -> Self {
        EntitlementRecord {
            identity: permission.identity,
            uuid: permission.uuid,
            entitlement_type: ENTITLEMENT_TYPE.to_string(),
            attributes: permission.attributes,
        }
    }
}
