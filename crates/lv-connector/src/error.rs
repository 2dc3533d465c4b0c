//! Connector error types
//!
//! Every failure a lifecycle command can report. Each error carries a stable
//! code, a host-facing category, and whether a later retry could succeed.

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Error category reported back to the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Any failure that is not a missing object.
    Generic,
    /// The requested account or entitlement does not exist.
    NotFound,
}

impl ErrorType {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorType::Generic => "generic",
            ErrorType::NotFound => "not_found",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The backend could not be reached.
    #[error("cannot reach backend: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("request timed out: {message}")]
    ConnectionTimeout { message: String },

    /// The backend answered with a 5xx status.
    #[error("backend unavailable: {message}")]
    TargetUnavailable { message: String },

    /// The exchange broke off after the connection was made.
    #[error("transport error: {message}")]
    NetworkError {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("authentication rejected: {message}")]
    AuthenticationFailed { message: String },

    #[error("permission denied: {message}")]
    InsufficientPermission { message: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// The host sent input the connector cannot interpret.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("unsupported: {operation}")]
    UnsupportedOperation { operation: String },

    #[error("not found: {identifier}")]
    ObjectNotFound { identifier: String },

    #[error("already exists: {identifier}")]
    ObjectAlreadyExists { identifier: String },

    /// Any other non-success backend status.
    #[error("{message} - {status} - {body}")]
    OperationFailed {
        message: String,
        status: u16,
        body: String,
    },

    /// The backend answered with data of an unexpected shape.
    #[error("unexpected backend data: {message}")]
    InvalidData { message: String },

    #[error("malformed JSON: {message}")]
    Serialization { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ConnectorError {
    /// Whether the same call could succeed if repeated later.
    pub fn is_transient(&self) -> bool {
        match self {
            ConnectorError::ConnectionFailed { .. }
            | ConnectorError::ConnectionTimeout { .. }
            | ConnectorError::TargetUnavailable { .. }
            | ConnectorError::NetworkError { .. } => true,
            _ => false,
        }
    }

    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Category reported to the host: only a missing object is `not_found`.
    pub fn error_type(&self) -> ErrorType {
        if matches!(self, ConnectorError::ObjectNotFound { .. }) {
            ErrorType::NotFound
        } else {
            ErrorType::Generic
        }
    }

    /// Stable machine-readable code.
    pub fn error_code(&self) -> &'static str {
        use ConnectorError::*;

        match self {
            ConnectionFailed { .. } => "CONNECTION_FAILED",
            ConnectionTimeout { .. } => "CONNECTION_TIMEOUT",
            TargetUnavailable { .. } => "TARGET_UNAVAILABLE",
            NetworkError { .. } => "NETWORK_ERROR",
            AuthenticationFailed { .. } => "AUTH_FAILED",
            InsufficientPermission { .. } => "INSUFFICIENT_PERMISSION",
            InvalidConfiguration { .. } => "INVALID_CONFIG",
            InvalidRequest { .. } => "INVALID_REQUEST",
            UnsupportedOperation { .. } => "UNSUPPORTED_OPERATION",
            ObjectNotFound { .. } => "OBJECT_NOT_FOUND",
            ObjectAlreadyExists { .. } => "OBJECT_EXISTS",
            OperationFailed { .. } => "OPERATION_FAILED",
            InvalidData { .. } => "INVALID_DATA",
            Serialization { .. } => "SERIALIZATION_ERROR",
            Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn connect(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn network(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::NetworkError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        ConnectorError::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        ConnectorError::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        ConnectorError::InvalidData {
            message: message.into(),
        }
    }

    pub fn unsupported(operation: impl Into<String>) -> Self {
        ConnectorError::UnsupportedOperation {
            operation: operation.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ConnectorError::Internal {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ConnectorError {
    fn from(err: serde_json::Error) -> Self {
        ConnectorError::Serialization {
            message: err.to_string(),
        }
    }
}

pub type ConnectorResult<T> = Result<T, ConnectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn io_error() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused")
    }

    #[test]
    fn test_transport_failures_are_transient() {
        let errors = [
            ConnectorError::connect("sys_user", io_error()),
            ConnectorError::network("sys_user", io_error()),
            ConnectorError::ConnectionTimeout {
                message: "60s".into(),
            },
            ConnectorError::TargetUnavailable {
                message: "502".into(),
            },
        ];

        for err in &errors {
            assert!(err.is_transient(), "{} should be transient", err.error_code());
        }
    }

    #[test]
    fn test_rejections_are_permanent() {
        let errors = [
            ConnectorError::AuthenticationFailed {
                message: "bad key".into(),
            },
            ConnectorError::invalid_request("no identity"),
            ConnectorError::unsupported("Set on groups"),
            ConnectorError::ObjectNotFound {
                identifier: "account 42".into(),
            },
        ];

        for err in &errors {
            assert!(err.is_permanent(), "{} should be permanent", err.error_code());
        }
    }

    #[test]
    fn test_only_missing_objects_are_not_found() {
        let missing = ConnectorError::ObjectNotFound {
            identifier: "42".into(),
        };
        assert_eq!(missing.error_type(), ErrorType::NotFound);
        assert_eq!(missing.error_type().to_string(), "not_found");

        assert_eq!(
            ConnectorError::invalid_data("bad").error_type(),
            ErrorType::Generic
        );
    }

    #[test]
    fn test_operation_failed_display() {
        let err = ConnectorError::OperationFailed {
            message: "Issue when trying to read account 42".into(),
            status: 400,
            body: "boom".into(),
        };
        assert_eq!(
            err.to_string(),
            "Issue when trying to read account 42 - 400 - boom"
        );
    }

    #[test]
    fn test_connect_keeps_source() {
        use std::error::Error as _;

        let err = ConnectorError::connect("sys_user", io_error());
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("refused"));
    }

    #[test]
    fn test_serde_error_conversion() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ConnectorError = source.into();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
