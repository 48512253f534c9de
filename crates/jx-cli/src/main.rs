use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jx_cli::commands::select;
use jx_cli::{Cli, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // Logs go to stderr so they never mix with selected records
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    let stats = select::run(&mut writer, &cli, &config)?;
    tracing::debug!(?stats, "scan finished");

    Ok(())
}
