//! # LandView Connector
//!
//! Identity-governance connector for the LandView REST API.
//!
//! Aggregates `sys_user` accounts, `sys_group` groups and `sys_permission`
//! permissions, and reconciles group memberships through the `user_group`
//! relation table.
//!
//! ## Features
//!
//! - Bearer API key authentication
//! - Cursor pagination over the `{header, data}` envelope
//! - Check-before-assign group membership
//! - Optional TLS verification bypass (`ignoreSSL`)
//!
//! ## Example
//!
//! ```ignore
//! use lv_connector::prelude::*;
//! use lv_connector_landview::{LandViewConfig, LandViewConnector};
//!
//! let config = LandViewConfig::new("https://landview.example.com")
//!     .with_api_key("my-api-key");
//!
//! let connector = LandViewConnector::new(config)?;
//! connector.test_connection().await?;
//! ```

pub mod client;
pub mod config;
pub mod connector;
pub mod endpoint;
pub mod model;
pub mod page;

// Re-exports
pub use client::LandViewClient;
pub use config::{ConfigError, LandViewConfig, LogVerbosity};
pub use connector::LandViewConnector;
pub use page::{Page, PageHeader};
