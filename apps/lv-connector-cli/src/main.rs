//! lv-connector - host entry point for the LandView connector
//!
//! Reads one lifecycle invocation (`{"type": ..., "input": ..., "config": ...}`)
//! from a file or stdin, runs it against LandView and writes every result
//! as a JSON line to stdout. Logs go to stderr.

use std::path::{Path, PathBuf};

use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lv_connector::command::Invocation;
use lv_connector::config::ConnectorConfig;
use lv_connector::dispatch::dispatch;
use lv_connector::traits::Connector;
use lv_connector_landview::LandViewConnector;

mod config;
mod error;
mod output;

use error::CliResult;
use output::JsonLineSink;

/// Run a LandView lifecycle command
#[derive(Parser)]
#[command(name = "lv-connector")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Read the invocation from FILE instead of stdin
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Source configuration JSON, used when the invocation carries none
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,lv_connector=debug,lv_connector_landview=debug")
        }))
        .init();

    let cli = Cli::parse();
    let mut sink = JsonLineSink::new(std::io::stdout());

    match run(cli, &mut sink).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            error!(code = e.code(), error = %e, "Command failed");
            if let Err(write_err) = sink.write_line(&e.to_json()) {
                eprintln!("Failed to write error: {write_err}");
            }
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli, sink: &mut JsonLineSink<std::io::Stdout>) -> CliResult<()> {
    let raw = read_invocation(cli.input.as_deref()).await?;
    let invocation = Invocation::from_json(&raw)?;
    let command = invocation.command()?;

    let config = config::resolve(&invocation, cli.config.as_deref()).await?;
    info!(
        command = %command.command_type(),
        config = ?config.redacted(),
        "Invocation loaded"
    );

    let connector = LandViewConnector::new(config)?;
    dispatch(&connector, command, sink).await?;

    info!(
        connector = %connector.display_name(),
        outputs = sink.written(),
        "Command completed"
    );
    Ok(())
}

async fn read_invocation(path: Option<&Path>) -> CliResult<String> {
    match path {
        Some(path) => Ok(tokio::fs::read_to_string(path).await?),
        None => {
            let mut raw = String::new();
            tokio::io::stdin().read_to_string(&mut raw).await?;
            Ok(raw)
        }
    }
}
