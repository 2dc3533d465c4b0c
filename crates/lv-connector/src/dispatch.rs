//! Lifecycle dispatcher
//!
//! Routes a parsed [`Command`] to the matching connector capability and
//! forwards every produced record to the host sink.

use serde::Serialize;
use tracing::{info, instrument};

use crate::command::Command;
use crate::error::ConnectorResult;
use crate::record::{AccountRecord, EntitlementRecord};
use crate::traits::{ResultSink, StdConnector};

/// Empty response body of a successful connection test.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TestConnectionOutput {}

/// Any record a lifecycle command can stream back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StdOutput {
    TestConnection(TestConnectionOutput),
    Account(AccountRecord),
    Entitlement(EntitlementRecord),
}

/// Adapts the host sink to the typed sinks list operations expect.
struct OutputSink<'a> {
    inner: &'a mut dyn ResultSink<StdOutput>,
}

impl ResultSink<AccountRecord> for OutputSink<'_> {
    fn send(&mut self, item: AccountRecord) -> ConnectorResult<()> {
        self.inner.send(StdOutput::Account(item))
    }
}

impl ResultSink<EntitlementRecord> for OutputSink<'_> {
    fn send(&mut self, item: EntitlementRecord) -> ConnectorResult<()> {
        self.inner.send(StdOutput::Entitlement(item))
    }
}

/// Execute one lifecycle command against a connector.
#[instrument(skip_all, fields(command = %command.command_type()))]
pub async fn dispatch<C>(
    connector: &C,
    command: Command,
    sink: &mut dyn ResultSink<StdOutput>,
) -> ConnectorResult<()>
where
    C: StdConnector + ?Sized,
{
    info!(connector = %connector.display_name(), "Running lifecycle command");

    match command {
        Command::TestConnection => {
            connector.test_connection().await?;
            sink.send(StdOutput::TestConnection(TestConnectionOutput::default()))
        }
        Command::AccountList => {
            let mut out = OutputSink { inner: sink };
            connector.list_accounts(&mut out).await
        }
        Command::AccountRead(input) => {
            let account = connector.read_account(&input.identity).await?;
            sink.send(StdOutput::Account(account))
        }
        Command::AccountCreate(input) => {
            let account = connector.create_account(input).await?;
            sink.send(StdOutput::Account(account))
        }
        Command::AccountUpdate(input) => {
            let account = connector
                .update_account(&input.identity, &input.changes)
                .await?;
            sink.send(StdOutput::Account(account))
        }
        Command::AccountEnable(input) => {
            let account = connector.enable_account(&input.identity).await?;
            sink.send(StdOutput::Account(account))
        }
        Command::AccountDisable(input) => {
            let account = connector.disable_account(&input.identity).await?;
            sink.send(StdOutput::Account(account))
        }
        Command::EntitlementList(input) => {
            let mut out = OutputSink { inner: sink };
            connector
                .list_entitlements(&input.entitlement_type, &mut out)
                .await
        }
        Command::EntitlementRead(input) => {
            let entitlement = connector
                .read_entitlement(&input.identity, &input.entitlement_type)
                .await?;
            sink.send(StdOutput::Entitlement(entitlement))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{AccountCreateInput, IdentityInput};
    use crate::error::ConnectorError;
    use crate::operation::{AttributeChange, AttributeSet};
    use crate::traits::{
        AccountOp, AccountStatusOp, Connector, CreateAccountOp, EntitlementOp, UpdateAccountOp,
    };
    use async_trait::async_trait;

    struct StaticConnector;

    fn account(identity: &str, disabled: bool) -> AccountRecord {
        AccountRecord {
            identity: identity.to_string(),
            uuid: format!("user{identity}"),
            disabled,
            locked: false,
            attributes: AttributeSet::new(),
        }
    }

    fn group(identity: &str) -> EntitlementRecord {
        EntitlementRecord {
            identity: identity.to_string(),
            uuid: format!("group{identity}"),
            entitlement_type: "group".to_string(),
            attributes: AttributeSet::new(),
        }
    }

    #[async_trait]
    impl Connector for StaticConnector {
        fn display_name(&self) -> &str {
            "static"
        }

        async fn test_connection(&self) -> ConnectorResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl AccountOp for StaticConnector {
        async fn list_accounts(
            &self,
            sink: &mut dyn ResultSink<AccountRecord>,
        ) -> ConnectorResult<()> {
            sink.send(account("1", false))?;
            sink.send(account("2", true))
        }

        async fn read_account(&self, identity: &str) -> ConnectorResult<AccountRecord> {
            if identity == "missing" {
                return Err(ConnectorError::ObjectNotFound {
                    identifier: identity.to_string(),
                });
            }
            Ok(account(identity, false))
        }
    }

    #[async_trait]
    impl CreateAccountOp for StaticConnector {
        async fn create_account(
            &self,
            _input: AccountCreateInput,
        ) -> ConnectorResult<AccountRecord> {
            Ok(account("99", false))
        }
    }

    #[async_trait]
    impl UpdateAccountOp for StaticConnector {
        async fn update_account(
            &self,
            identity: &str,
            _changes: &[AttributeChange],
        ) -> ConnectorResult<AccountRecord> {
            Ok(account(identity, false))
        }
    }

    #[async_trait]
    impl AccountStatusOp for StaticConnector {
        async fn enable_account(&self, identity: &str) -> ConnectorResult<AccountRecord> {
            Ok(account(identity, false))
        }

        async fn disable_account(&self, identity: &str) -> ConnectorResult<AccountRecord> {
            Ok(account(identity, true))
        }
    }

    #[async_trait]
    impl EntitlementOp for StaticConnector {
        async fn list_entitlements(
            &self,
            _entitlement_type: &str,
            sink: &mut dyn ResultSink<EntitlementRecord>,
        ) -> ConnectorResult<()> {
            sink.send(group("10"))
        }

        async fn read_entitlement(
            &self,
            identity: &str,
            _entitlement_type: &str,
        ) -> ConnectorResult<EntitlementRecord> {
            Ok(group(identity))
        }
    }

    #[tokio::test]
    async fn test_dispatch_test_connection_sends_empty_object() {
        let mut out: Vec<StdOutput> = Vec::new();
        dispatch(&StaticConnector, Command::TestConnection, &mut out)
            .await
            .unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(serde_json::to_string(&out[0]).unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_dispatch_account_list_streams_each_record() {
        let mut out: Vec<StdOutput> = Vec::new();
        dispatch(&StaticConnector, Command::AccountList, &mut out)
            .await
            .unwrap();

        assert_eq!(out.len(), 2);
        assert!(matches!(&out[1], StdOutput::Account(a) if a.disabled));
    }

    #[tokio::test]
    async fn test_dispatch_disable() {
        let mut out: Vec<StdOutput> = Vec::new();
        let command = Command::AccountDisable(IdentityInput {
            identity: "5".to_string(),
        });
        dispatch(&StaticConnector, command, &mut out).await.unwrap();

        assert_eq!(out, vec![StdOutput::Account(account("5", true))]);
    }

    #[tokio::test]
    async fn test_dispatch_propagates_errors_without_output() {
        let mut out: Vec<StdOutput> = Vec::new();
        let command = Command::AccountRead(IdentityInput {
            identity: "missing".to_string(),
        });
        let err = dispatch(&StaticConnector, command, &mut out)
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "OBJECT_NOT_FOUND");
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_entitlement_list() {
        let mut out: Vec<StdOutput> = Vec::new();
        let command = Command::EntitlementList(Default::default());
        dispatch(&StaticConnector, command, &mut out).await.unwrap();

        assert_eq!(out, vec![StdOutput::Entitlement(group("10"))]);
    }
}
