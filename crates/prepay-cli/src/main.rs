//! Prepay CLI - Command-line interface for prepayment risk pricing.
//!
//! # Usage
//!
//! ```bash
//! # Price a portfolio under the Vasicek model
//! prepay run --portfolio credits.csv --history rates.csv --risk-free curves.csv \
//!     --cutoff 2025-01-31 --simulations 500
//!
//! # Same run, parameters from a TOML file, JSON output
//! prepay --format json run --config run.toml --portfolio credits.csv \
//!     --history rates.csv --risk-free curves.csv
//!
//! # Inspect calibrations only
//! prepay calibrate --portfolio credits.csv --history rates.csv --cutoff 2025-01-31
//!
//! # Contractual schedule of one credit on the band grid
//! prepay schedule --portfolio credits.csv --id C-001 --cutoff 2025-01-31
//!
//! # Normative band table
//! prepay bands
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod error;
mod input;
mod output;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let format = cli.format;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args, format)?,
        Commands::Calibrate(args) => commands::calibrate::execute(args, format)?,
        Commands::Schedule(args) => commands::schedule::execute(args, format)?,
        Commands::Bands(args) => commands::bands::execute(args, format)?,
        Commands::Config(args) => commands::config::execute(args, format)?,
    }

    Ok(())
}

/// Logs go to stderr; stdout carries only command output.
fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
