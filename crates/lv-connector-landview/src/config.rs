//! LandView connector configuration
//!
//! The host hands the connector its source configuration as camelCase JSON
//! (`baseUrl`, `apiKey`, `ignoreSSL`). The same settings can be read from
//! `LANDVIEW_*` environment variables.

use lv_connector::config::{ConnectorConfig, Credentials, Timeouts, REDACTED};
use lv_connector::error::{ConnectorError, ConnectorResult};
use serde::{Deserialize, Serialize};

/// How much of each backend exchange is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogVerbosity {
    /// Nothing per request.
    Quiet,
    /// Method, URL and status.
    #[default]
    Normal,
    /// Method, URL, status and response body.
    Debug,
}

impl LogVerbosity {
    #[must_use]
    pub fn log_bodies(self) -> bool {
        self == LogVerbosity::Debug
    }

    #[must_use]
    pub fn is_enabled(self) -> bool {
        self != LogVerbosity::Quiet
    }
}

impl std::str::FromStr for LogVerbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" => Ok(LogVerbosity::Quiet),
            "normal" => Ok(LogVerbosity::Normal),
            "debug" => Ok(LogVerbosity::Debug),
            other => Err(format!("'{other}', expected quiet, normal or debug")),
        }
    }
}

/// Configuration for the LandView connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandViewConfig {
    /// Root of the LandView instance, e.g. `https://landview.example.com`.
    pub base_url: String,

    /// API key, sent as a bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Explicit credentials; take precedence over `api_key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,

    /// Accept any server certificate.
    #[serde(default, rename = "ignoreSSL")]
    pub ignore_ssl: bool,

    #[serde(default)]
    pub timeouts: Timeouts,

    #[serde(default)]
    pub log_verbosity: LogVerbosity,
}

impl LandViewConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            credentials: None,
            ignore_ssl: false,
            timeouts: Timeouts::default(),
            log_verbosity: LogVerbosity::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_ignore_ssl(mut self) -> Self {
        self.ignore_ssl = true;
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_log_verbosity(mut self, verbosity: LogVerbosity) -> Self {
        self.log_verbosity = verbosity;
        self
    }

    /// Credentials actually sent: explicit ones, else the API key as a bearer
    /// token.
    pub fn effective_credentials(&self) -> Credentials {
        match (&self.credentials, &self.api_key) {
            (Some(credentials), _) => credentials.clone(),
            (None, Some(key)) => Credentials::bearer(key.as_str()),
            (None, None) => Credentials::Anonymous,
        }
    }

    /// Parse the host's JSON source configuration.
    pub fn from_json(value: serde_json::Value) -> ConnectorResult<Self> {
        serde_json::from_value(value).map_err(|e| {
            ConnectorError::invalid_configuration(format!("invalid source configuration: {e}"))
        })
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration through a variable lookup function, so tests can
    /// supply variables without touching the process environment.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let var = |key: &str| reader(key).ok().filter(|v| !v.trim().is_empty());
        let invalid = |key: &str, e: String| ConfigError::InvalidValue(key.to_string(), e);

        let base_url = var("LANDVIEW_BASE_URL")
            .ok_or_else(|| ConfigError::MissingVar("LANDVIEW_BASE_URL".into()))?;

        let mut config = Self::new(base_url);
        config.api_key = var("LANDVIEW_API_KEY");

        if let Some(raw) = var("LANDVIEW_IGNORE_SSL") {
            config.ignore_ssl = raw
                .parse::<bool>()
                .map_err(|e| invalid("LANDVIEW_IGNORE_SSL", e.to_string()))?;
        }

        if let Some(raw) = var("LANDVIEW_LOG_VERBOSITY") {
            config.log_verbosity = raw
                .parse()
                .map_err(|e| invalid("LANDVIEW_LOG_VERBOSITY", e))?;
        }

        if let Some(raw) = var("LANDVIEW_CONNECT_TIMEOUT_SECS") {
            config.timeouts.connect_secs = raw
                .parse()
                .map_err(|e: std::num::ParseIntError| {
                    invalid("LANDVIEW_CONNECT_TIMEOUT_SECS", e.to_string())
                })?;
        }

        if let Some(raw) = var("LANDVIEW_READ_TIMEOUT_SECS") {
            config.timeouts.read_secs = raw
                .parse()
                .map_err(|e: std::num::ParseIntError| {
                    invalid("LANDVIEW_READ_TIMEOUT_SECS", e.to_string())
                })?;
        }

        Ok(config)
    }
}

impl ConnectorConfig for LandViewConfig {
    fn validate(&self) -> ConnectorResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ConnectorError::invalid_configuration("baseUrl is required"));
        }

        let url = url::Url::parse(&self.base_url)
            .map_err(|e| ConnectorError::invalid_configuration(format!("invalid baseUrl: {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConnectorError::invalid_configuration(format!(
                "baseUrl must be http or https, got {}",
                url.scheme()
            )));
        }

        if self.effective_credentials().is_anonymous() {
            return Err(ConnectorError::invalid_configuration("apiKey is required"));
        }

        Ok(())
    }

    fn get_credentials(&self) -> Vec<(&'static str, String)> {
        self.effective_credentials().secrets()
    }

    fn redacted(&self) -> Self {
        Self {
            api_key: self.api_key.as_ref().map(|_| REDACTED.to_string()),
            credentials: self.credentials.as_ref().map(Credentials::redacted),
            ..self.clone()
        }
    }
}

/// Errors reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl From<ConfigError> for ConnectorError {
    fn from(err: ConfigError) -> Self {
        ConnectorError::invalid_configuration(err.to_string())
    }
}
