//! Source configuration resolution

use std::path::Path;

use lv_connector::command::Invocation;
use lv_connector::error::ConnectorError;
use lv_connector_landview::LandViewConfig;
use tracing::debug;

use crate::error::CliResult;

/// Resolve the LandView configuration for an invocation.
///
/// The invocation's own `config` block wins, then the `--config` file, then
/// `LANDVIEW_*` environment variables.
pub async fn resolve(
    invocation: &Invocation,
    config_path: Option<&Path>,
) -> CliResult<LandViewConfig> {
    if let Some(value) = &invocation.config {
        debug!("Using configuration from invocation");
        return Ok(LandViewConfig::from_json(value.clone())?);
    }

    if let Some(path) = config_path {
        debug!(path = %path.display(), "Using configuration file");
        let raw = tokio::fs::read_to_string(path).await?;
        let value = serde_json::from_str(&raw).map_err(|e| {
            ConnectorError::invalid_configuration(format!("{}: {e}", path.display()))
        })?;
        return Ok(LandViewConfig::from_json(value)?);
    }

    debug!("Using configuration from environment");
    Ok(LandViewConfig::from_env()?)
}
