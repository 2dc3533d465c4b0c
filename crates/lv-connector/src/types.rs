//! Lifecycle command names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle command the host can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandType {
    #[serde(rename = "std:test-connection")]
    TestConnection,
    #[serde(rename = "std:account:list")]
    AccountList,
    #[serde(rename = "std:account:read")]
    AccountRead,
    #[serde(rename = "std:account:create")]
    AccountCreate,
    #[serde(rename = "std:account:update")]
    AccountUpdate,
    #[serde(rename = "std:account:enable")]
    AccountEnable,
    #[serde(rename = "std:account:disable")]
    AccountDisable,
    #[serde(rename = "std:entitlement:list")]
    EntitlementList,
    #[serde(rename = "std:entitlement:read")]
    EntitlementRead,
}

impl CommandType {
    /// Get all supported commands.
    #[must_use]
    pub fn all() -> &'static [CommandType] {
        &[
            CommandType::TestConnection,
            CommandType::AccountList,
            CommandType::AccountRead,
            CommandType::AccountCreate,
            CommandType::AccountUpdate,
            CommandType::AccountEnable,
            CommandType::AccountDisable,
            CommandType::EntitlementList,
            CommandType::EntitlementRead,
        ]
    }

    /// Get the wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::TestConnection => "std:test-connection",
            CommandType::AccountList => "std:account:list",
            CommandType::AccountRead => "std:account:read",
            CommandType::AccountCreate => "std:account:create",
            CommandType::AccountUpdate => "std:account:update",
            CommandType::AccountEnable => "std:account:enable",
            CommandType::AccountDisable => "std:account:disable",
            CommandType::EntitlementList => "std:entitlement:list",
            CommandType::EntitlementRead => "std:entitlement:read",
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CommandType {
    type Err = ParseCommandTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandType::all()
            .iter()
            .find(|command| command.as_str() == s)
            .copied()
            .ok_or_else(|| ParseCommandTypeError(s.to_string()))
    }
}

/// Error parsing a command type from string.
#[derive(Debug, Clone)]
pub struct ParseCommandTypeError(String);

impl fmt::Display for ParseCommandTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported command type '{}'", self.0)
    }
}

impl std::error::Error for ParseCommandTypeError {}
