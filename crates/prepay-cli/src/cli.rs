//! CLI argument definitions.

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{BandsArgs, CalibrateArgs, ConfigArgs, RunArgs, ScheduleArgs};

/// Prepay - Prepayment risk pricing under short-rate models
#[derive(Parser)]
#[command(name = "prepay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Price a portfolio: prepayment scenarios, present values and deltas
    Run(RunArgs),

    /// Calibrate the rate model and report its goodness of fit
    Calibrate(CalibrateArgs),

    /// Show the contractual schedule of a credit on the band grid
    Schedule(ScheduleArgs),

    /// Show the normative band table
    Bands(BandsArgs),

    /// Print or check a run configuration
    Config(ConfigArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}
