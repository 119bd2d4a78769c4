//! snaptile - keyboard-driven window snapping
//!
//! Binary entry point: parses arguments, initializes logging and hands off to
//! the CLI executor.

use clap::Parser;
use snaptile::{
    cli::{run_cli, SnapTileCli},
    logging::{init_logging, LogConfig},
    Result, SnapTileError,
};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = SnapTileCli::parse();

    let mut log_config = LogConfig::from_env();
    if cli.verbose {
        log_config = log_config.verbose();
    }
    init_logging(&log_config).map_err(|e| {
        SnapTileError::ConfigurationError(format!("Failed to initialize logging: {}", e))
    })?;

    debug!("snaptile v{}", env!("CARGO_PKG_VERSION"));
    run_cli(cli).await
}
