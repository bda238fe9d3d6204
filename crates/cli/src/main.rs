use std::process::ExitCode;

use anyhow::Result;
use pmflow_core::config::{AppConfig, LoadOptions, LogFormat};
use tracing::Level;

/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_logging(config: &AppConfig) -> Result<()> {
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let installed = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|error| anyhow::anyhow!(error))
}

fn main() -> Result<ExitCode> {
    // Commands report config errors themselves; logging just stays off.
    if let Ok(config) = AppConfig::load(LoadOptions::default()) {
        init_logging(&config)?;
    }

    Ok(pmflow_cli::run())
}
