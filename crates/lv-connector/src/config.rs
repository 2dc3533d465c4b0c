//! Shared configuration pieces
//!
//! Every connector configuration is validated before use and knows which of
//! its fields are secrets, so it can always be logged in redacted form.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::ConnectorResult;

/// Mask substituted for secret values.
pub const REDACTED: &str = "***REDACTED***";

/// Trait for connector-specific configuration.
pub trait ConnectorConfig: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Check the configuration before any connection is attempted.
    fn validate(&self) -> ConnectorResult<()>;

    /// Secret values held by this configuration, keyed by field name.
    fn get_credentials(&self) -> Vec<(&'static str, String)>;

    /// Copy of this configuration with every secret masked.
    fn redacted(&self) -> Self;
}

/// Request timeouts, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeouts {
    #[serde(default = "Timeouts::default_connect_secs")]
    pub connect_secs: u64,

    #[serde(default = "Timeouts::default_read_secs")]
    pub read_secs: u64,
}

impl Timeouts {
    const DEFAULT_CONNECT_SECS: u64 = 30;
    const DEFAULT_READ_SECS: u64 = 60;

    fn default_connect_secs() -> u64 {
        Self::DEFAULT_CONNECT_SECS
    }

    fn default_read_secs() -> u64 {
        Self::DEFAULT_READ_SECS
    }

    pub fn new(connect_secs: u64, read_secs: u64) -> Self {
        Self {
            connect_secs,
            read_secs,
        }
    }

    /// Time allowed to establish a connection.
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    /// Time allowed for a whole request, including the response body.
    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CONNECT_SECS, Self::DEFAULT_READ_SECS)
    }
}

/// How requests authenticate against the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    /// No credentials.
    #[default]
    Anonymous,

    /// `Authorization: Bearer <token>`.
    Bearer { token: String },

    /// `Authorization: Basic <base64(username:password)>`.
    Basic { username: String, password: String },

    /// Secret sent verbatim in a named header.
    Header { name: String, value: String },
}

impl Credentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Credentials::Bearer {
            token: token.into(),
        }
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn custom_header(name: impl Into<String>, value: impl Into<String>) -> Self {
        Credentials::Header {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Credentials::Anonymous)
    }

    /// Header name and value to attach to every request.
    pub fn to_header(&self) -> Option<(String, String)> {
        match self {
            Credentials::Anonymous => None,
            Credentials::Bearer { token } => {
                Some(("Authorization".to_string(), format!("Bearer {token}")))
            }
            Credentials::Basic { username, password } => Some((
                "Authorization".to_string(),
                format!("Basic {}", STANDARD.encode(format!("{username}:{password}"))),
            )),
            Credentials::Header { name, value } => Some((name.clone(), value.clone())),
        }
    }

    /// Secret values, keyed by field name.
    pub fn secrets(&self) -> Vec<(&'static str, String)> {
        match self {
            Credentials::Anonymous => Vec::new(),
            Credentials::Bearer { token } => vec![("token", token.clone())],
            Credentials::Basic { password, .. } => vec![("password", password.clone())],
            Credentials::Header { value, .. } => vec![("value", value.clone())],
        }
    }

    /// Same credentials with the secret part masked.
    pub fn redacted(&self) -> Self {
        match self {
            Credentials::Anonymous => Credentials::Anonymous,
            Credentials::Bearer { .. } => Credentials::bearer(REDACTED),
            Credentials::Basic { username, .. } => Credentials::basic(username.as_str(), REDACTED),
            Credentials::Header { name, .. } => Credentials::custom_header(name.as_str(), REDACTED),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeouts() {
        let defaults = Timeouts::default();
        assert_eq!(defaults.connect(), Duration::from_secs(30));
        assert_eq!(defaults.read(), Duration::from_secs(60));

        let partial: Timeouts = serde_json::from_str(r#"{"readSecs": 5}"#).unwrap();
        assert_eq!(partial, Timeouts::new(30, 5));
    }

    #[test]
    fn test_credentials_headers() {
        assert_eq!(
            Credentials::bearer("lv-token").to_header(),
            Some(("Authorization".to_string(), "Bearer lv-token".to_string()))
        );
        assert_eq!(
            Credentials::basic("svc", "pw").to_header(),
            Some(("Authorization".to_string(), "Basic c3ZjOnB3".to_string()))
        );
        assert_eq!(
            Credentials::custom_header("X-LV-Key", "abc").to_header(),
            Some(("X-LV-Key".to_string(), "abc".to_string()))
        );
        assert_eq!(Credentials::Anonymous.to_header(), None);
    }

    #[test]
    fn test_credentials_redacted_keeps_identity() {
        let basic = Credentials::basic("svc", "pw").redacted();
        assert_eq!(basic, Credentials::basic("svc", REDACTED));
        assert!(basic.secrets().iter().all(|(_, v)| v == REDACTED));
    }

    #[test]
    fn test_credentials_deserialize_tagged() {
        let creds: Credentials =
            serde_json::from_str(r#"{"type":"header","name":"X-LV-Key","value":"abc"}"#).unwrap();
        assert_eq!(creds, Credentials::custom_header("X-LV-Key", "abc"));

        let none: Credentials = serde_json::from_str(r#"{"type":"anonymous"}"#).unwrap();
        assert!(none.is_anonymous());
    }
}
