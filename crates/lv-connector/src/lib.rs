//! # Connector Lifecycle Contract
//!
//! Core abstractions shared by identity-governance connectors.
//!
//! The host platform drives a connector through a fixed set of lifecycle
//! commands (`std:test-connection`, `std:account:*`, `std:entitlement:*`).
//! This crate defines the wire shapes of those commands and of the records
//! they return, plus the capability traits a connector implements.
//!
//! ## Architecture
//!
//! - [`traits::Connector`] - Base trait all connectors implement
//! - [`traits::AccountOp`], [`traits::CreateAccountOp`],
//!   [`traits::UpdateAccountOp`], [`traits::AccountStatusOp`] - Account lifecycle
//! - [`traits::EntitlementOp`] - Entitlement aggregation
//! - [`dispatch::dispatch`] - Routes a host [`command::Invocation`] to a connector
//!
//! ## Example
//!
//! ```ignore
//! use lv_connector::prelude::*;
//!
//! let invocation = Invocation::from_json(&raw)?;
//! let mut out: Vec<StdOutput> = Vec::new();
//! dispatch(&connector, invocation.command()?, &mut out).await?;
//! ```

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod operation;
pub mod record;
pub mod traits;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::command::{
        AccountCreateInput, AccountUpdateInput, Command, EntitlementListInput,
        EntitlementReadInput, IdentityInput, Invocation,
    };
    pub use crate::config::{ConnectorConfig, Credentials, Timeouts};
    pub use crate::dispatch::{dispatch, StdOutput, TestConnectionOutput};
    pub use crate::error::{ConnectorError, ConnectorResult, ErrorType};
    pub use crate::operation::{AttributeChange, AttributeChangeOp, AttributeSet, AttributeValue};
    pub use crate::record::{AccountRecord, EntitlementRecord};
    pub use crate::traits::{
        AccountOp, AccountStatusOp, Connector, CreateAccountOp, EntitlementOp, ResultSink,
        StdConnector, UpdateAccountOp,
    };
    pub use crate::types::CommandType;
}

// Re-export async_trait for connector implementors
pub use async_trait::async_trait;
