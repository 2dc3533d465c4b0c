//! Connector lifecycle traits
//!
//! Capability-based trait definitions for the host lifecycle contract. A
//! connector implements one trait per group of lifecycle commands it
//! supports; [`StdConnector`] is implemented for anything that covers them all.

use async_trait::async_trait;

use crate::command::AccountCreateInput;
use crate::error::ConnectorResult;
use crate::operation::AttributeChange;
use crate::record::{AccountRecord, EntitlementRecord};

/// Streaming response channel for a lifecycle call.
///
/// List commands send one item per record as it is produced; read and write
/// commands send exactly one.
pub trait ResultSink<T>: Send {
    /// Hand one result to the host.
    fn send(&mut self, item: T) -> ConnectorResult<()>;
}

impl<T: Send> ResultSink<T> for Vec<T> {
    fn send(&mut self, item: T) -> ConnectorResult<()> {
        self.push(item);
        Ok(())
    }
}

/// A configured connection to one backend instance.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Human-readable name of this instance, used in logs.
    fn display_name(&self) -> &str;

    /// Test the connection to the backend.
    ///
    /// Returns `Ok(())` if the backend answered successfully, or an error
    /// describing what went wrong.
    async fn test_connection(&self) -> ConnectorResult<()>;
}

/// Capability for aggregating and reading accounts.
#[async_trait]
pub trait AccountOp: Connector {
    /// Stream every account in the backend.
    async fn list_accounts(
        &self,
        sink: &mut dyn ResultSink<AccountRecord>,
    ) -> ConnectorResult<()>;

    /// Read a single account, including its group memberships.
    async fn read_account(&self, identity: &str) -> ConnectorResult<AccountRecord>;
}

/// Capability for creating accounts.
#[async_trait]
pub trait CreateAccountOp: Connector {
    /// Create an account, or return the existing one when it is already
    /// present in the backend.
    async fn create_account(&self, input: AccountCreateInput) -> ConnectorResult<AccountRecord>;
}

/// Capability for updating accounts.
#[async_trait]
pub trait UpdateAccountOp: Connector {
    /// Apply attribute changes and return the account as it now stands.
    async fn update_account(
        &self,
        identity: &str,
        changes: &[AttributeChange],
    ) -> ConnectorResult<AccountRecord>;
}

/// Capability for enabling and disabling accounts.
#[async_trait]
pub trait AccountStatusOp: Connector {
    /// Enable a previously disabled account.
    async fn enable_account(&self, identity: &str) -> ConnectorResult<AccountRecord>;

    /// Disable an account.
    async fn disable_account(&self, identity: &str) -> ConnectorResult<AccountRecord>;
}

/// Capability for aggregating and reading entitlements.
#[async_trait]
pub trait EntitlementOp: Connector {
    /// Stream every entitlement of the given type.
    async fn list_entitlements(
        &self,
        entitlement_type: &str,
        sink: &mut dyn ResultSink<EntitlementRecord>,
    ) -> ConnectorResult<()>;

    /// Read a single entitlement.
    async fn read_entitlement(
        &self,
        identity: &str,
        entitlement_type: &str,
    ) -> ConnectorResult<EntitlementRecord>;
}

/// Marker trait for connectors that support the full lifecycle contract.
pub trait StdConnector:
    AccountOp + CreateAccountOp + UpdateAccountOp + AccountStatusOp + EntitlementOp
{
}

impl<T> StdConnector for T where
    T: AccountOp + CreateAccountOp + UpdateAccountOp + AccountStatusOp + EntitlementOp
{
}
