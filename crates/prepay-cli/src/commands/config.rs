//! Config command implementation.
//!
//! Writes a starter run configuration or shows the resolved one.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use prepay_core::Date;
use prepay_engine::PipelineConfig;

use super::{parse_date, RunParams};
use crate::cli::OutputFormat;
use crate::output::{print_document, print_header, print_output, print_success, KeyValue};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a configuration with default settings
    Init(InitArgs),

    /// Validate and show the configuration a run would use
    Show(ShowArgs),
}

/// Arguments for init subcommand.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Valuation cut-off date
    #[arg(long, value_parser = parse_date)]
    pub cutoff: Date,

    /// Destination file; printed to stdout when absent
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for show subcommand.
#[derive(Args, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub params: RunParams,
}

/// Executes the config command.
pub fn execute(args: ConfigArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        ConfigCommand::Init(init) => execute_init(init),
        ConfigCommand::Show(show) => execute_show(&show.params, format),
    }
}

fn execute_init(args: InitArgs) -> Result<()> {
    let toml = PipelineConfig::new(args.cutoff).to_toml_string()?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, toml)?;
            print_success(&format!("Configuration written to {}", path.display()));
        }
        None => print!("{toml}"),
    }
    Ok(())
}

fn execute_show(params: &RunParams, format: OutputFormat) -> Result<()> {
    let config = params.resolve()?;
    if format == OutputFormat::Json {
        return print_document(&config);
    }

    if format == OutputFormat::Table {
        print_header("Run Configuration");
    }
    let rows = vec![
        KeyValue::new("cutoff", config.cutoff.to_string()),
        KeyValue::new("model", config.model.to_string()),
        KeyValue::new("simulations", config.simulations.to_string()),
        KeyValue::new("seed", config.seed.to_string()),
        KeyValue::new("interpolation", config.interpolation.to_string()),
        KeyValue::from_float("differential_pct", config.differential_pct, 4),
        KeyValue::new("optimizer.tolerance", config.optimizer.tolerance.to_string()),
        KeyValue::new("optimizer.max_iterations", config.optimizer.max_iterations.to_string()),
        KeyValue::new("optimizer.initial_step", config.optimizer.initial_step.to_string()),
    ];
    print_output(&rows, format)
}
