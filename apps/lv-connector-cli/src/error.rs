//! CLI error types and exit codes

use serde_json::{json, Value};
use thiserror::Error;

use lv_connector::error::{ConnectorError, ErrorType};
use lv_connector_landview::ConfigError;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 2: Authentication or authorization failure
/// - 3: Network error
/// - 4: Invalid request or missing object
/// - 5: Backend error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Connector(e) => match e {
                ConnectorError::AuthenticationFailed { .. }
                | ConnectorError::InsufficientPermission { .. } => 2,
                ConnectorError::InvalidConfiguration { .. }
                | ConnectorError::InvalidRequest { .. }
                | ConnectorError::UnsupportedOperation { .. }
                | ConnectorError::ObjectNotFound { .. }
                | ConnectorError::ObjectAlreadyExists { .. } => 4,
                ConnectorError::TargetUnavailable { .. }
                | ConnectorError::OperationFailed { .. } => 5,
                e if e.is_transient() => 3,
                _ => 1,
            },
            CliError::Config(_) => 4,
            CliError::Io(_) => 1,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Connector(e) => e.error_code(),
            CliError::Config(_) => "INVALID_CONFIG",
            CliError::Io(_) => "IO_ERROR",
        }
    }

    /// Error classification reported to the host.
    pub fn error_type(&self) -> ErrorType {
        match self {
            CliError::Connector(e) => e.error_type(),
            _ => ErrorType::Generic,
        }
    }

    /// Error envelope written to stdout.
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code(),
                "type": self.error_type().as_str(),
                "message": self.to_string(),
            }
        })
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}
