//! Record shapes returned to the host.

use serde::{Deserialize, Serialize};

use crate::operation::AttributeSet;

/// An account as the host sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Native identifier in the backend.
    pub identity: String,
    /// Human-readable unique name.
    pub uuid: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub locked: bool,
    pub attributes: AttributeSet,
}

/// An entitlement (group or permission) as the host sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitlementRecord {
    pub identity: String,
    pub uuid: String,
    /// Entitlement type declared in the host schema.
    #[serde(rename = "type")]
    pub entitlement_type: String,
    pub attributes: AttributeSet,
}
