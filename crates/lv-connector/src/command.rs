//! Host invocation envelope and typed command inputs.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConnectorError, ConnectorResult};
use crate::operation::{AttributeChange, AttributeSet};
use crate::types::CommandType;

/// One call from the host: `{ "type": ..., "input": {...}, "config": {...} }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invocation {
    #[serde(rename = "type")]
    pub command_type: String,
    #[serde(default)]
    pub input: Value,
    /// Source configuration, when the host ships it with the call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl Invocation {
    /// Parse an invocation from raw JSON.
    pub fn from_json(raw: &str) -> ConnectorResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| ConnectorError::invalid_request(format!("malformed invocation: {e}")))
    }

    /// Resolve the typed command carried by this invocation.
    pub fn command(&self) -> ConnectorResult<Command> {
        let command_type: CommandType = self
            .command_type
            .parse()
            .map_err(|_| ConnectorError::unsupported(self.command_type.clone()))?;

        let command = match command_type {
            CommandType::TestConnection => Command::TestConnection,
            CommandType::AccountList => Command::AccountList,
            CommandType::AccountRead => Command::AccountRead(self.input(command_type)?),
            CommandType::AccountCreate => Command::AccountCreate(self.input(command_type)?),
            CommandType::AccountUpdate => Command::AccountUpdate(self.input(command_type)?),
            CommandType::AccountEnable => Command::AccountEnable(self.input(command_type)?),
            CommandType::AccountDisable => Command::AccountDisable(self.input(command_type)?),
            CommandType::EntitlementList => {
                let input = if self.input.is_null() {
                    EntitlementListInput::default()
                } else {
                    self.input(command_type)?
                };
                Command::EntitlementList(input)
            }
            CommandType::EntitlementRead => Command::EntitlementRead(self.input(command_type)?),
        };

        Ok(command)
    }

    fn input<T: DeserializeOwned>(&self, command_type: CommandType) -> ConnectorResult<T> {
        serde_json::from_value(self.input.clone()).map_err(|e| {
            ConnectorError::invalid_request(format!("invalid input for {command_type}: {e}"))
        })
    }
}

/// A typed lifecycle command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    TestConnection,
    AccountList,
    AccountRead(IdentityInput),
    AccountCreate(AccountCreateInput),
    AccountUpdate(AccountUpdateInput),
    AccountEnable(IdentityInput),
    AccountDisable(IdentityInput),
    EntitlementList(EntitlementListInput),
    EntitlementRead(EntitlementReadInput),
}

impl Command {
    /// The command type this command was parsed from.
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::TestConnection => CommandType::TestConnection,
            Command::AccountList => CommandType::AccountList,
            Command::AccountRead(_) => CommandType::AccountRead,
            Command::AccountCreate(_) => CommandType::AccountCreate,
            Command::AccountUpdate(_) => CommandType::AccountUpdate,
            Command::AccountEnable(_) => CommandType::AccountEnable,
            Command::AccountDisable(_) => CommandType::AccountDisable,
            Command::EntitlementList(_) => CommandType::EntitlementList,
            Command::EntitlementRead(_) => CommandType::EntitlementRead,
        }
    }
}

/// Input naming a single account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityInput {
    pub identity: String,
}

/// Input for account creation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccountCreateInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(default)]
    pub attributes: AttributeSet,
}

/// Input for account update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountUpdateInput {
    pub identity: String,
    #[serde(default)]
    pub changes: Vec<AttributeChange>,
}

/// Input for entitlement aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitlementListInput {
    #[serde(rename = "type", default = "default_entitlement_type")]
    pub entitlement_type: String,
}

impl Default for EntitlementListInput {
    fn default() -> Self {
        Self {
            entitlement_type: default_entitlement_type(),
        }
    }
}

/// Input for a single entitlement read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitlementReadInput {
    pub identity: String,
    #[serde(rename = "type", default = "default_entitlement_type")]
    pub entitlement_type: String,
}

fn default_entitlement_type() -> String {
    "group".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::AttributeChangeOp;
    use serde_json::json;

    #[test]
    fn test_parse_account_read() {
        let invocation = Invocation::from_json(
            r#"{"type":"std:account:read","input":{"identity":"42"}}"#,
        )
        .unwrap();

        let command = invocation.command().unwrap();
        assert_eq!(
            command,
            Command::AccountRead(IdentityInput {
                identity: "42".to_string()
            })
        );
        assert_eq!(command.command_type(), CommandType::AccountRead);
    }

    #[test]
    fn test_parse_test_connection_without_input() {
        let invocation = Invocation::from_json(r#"{"type":"std:test-connection"}"#).unwrap();
        assert_eq!(invocation.command().unwrap(), Command::TestConnection);
    }

    #[test]
    fn test_parse_account_update_changes() {
        let invocation: Invocation = serde_json::from_value(json!({
            "type": "std:account:update",
            "input": {
                "identity": "7",
                "changes": [
                    { "op": "Add", "attribute": "groups", "value": "3" },
                    { "op": "Remove", "attribute": "groups", "value": ["4", "5"] }
                ]
            }
        }))
        .unwrap();

        match invocation.command().unwrap() {
            Command::AccountUpdate(input) => {
                assert_eq!(input.identity, "7");
                assert_eq!(input.changes.len(), 2);
                assert_eq!(input.changes[1].op, AttributeChangeOp::Remove);
            }
            other => panic!("Expected AccountUpdate, got {other:?}"),
        }
    }

    #[test]
    fn test_entitlement_list_defaults_to_group() {
        let invocation = Invocation::from_json(r#"{"type":"std:entitlement:list"}"#).unwrap();
        assert_eq!(
            invocation.command().unwrap(),
            Command::EntitlementList(EntitlementListInput::default())
        );
    }

    #[test]
    fn test_unknown_command_is_unsupported() {
        let invocation = Invocation::from_json(r#"{"type":"std:account:delete"}"#).unwrap();
        let err = invocation.command().unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_OPERATION");
    }

    #[test]
    fn test_missing_identity_is_invalid_request() {
        let invocation =
            Invocation::from_json(r#"{"type":"std:account:enable","input":{}}"#).unwrap();
        let err = invocation.command().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_REQUEST");
        assert!(err.to_string().contains("std:account:enable"));
    }

    #[test]
    fn test_config_block_is_kept() {
        let invocation = Invocation::from_json(
            r#"{"type":"std:test-connection","config":{"baseUrl":"https://lv.example.com"}}"#,
        )
        .unwrap();
        assert_eq!(
            invocation.config.unwrap()["baseUrl"],
            "https://lv.example.com"
        );
    }
}
