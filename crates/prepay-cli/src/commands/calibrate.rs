//! Calibrate command: fit the rate model and report goodness of fit.

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::Args;
use prepay_engine::{Calibration, PipelineCoordinator};
use prepay_models::model::ModelParameters;
use prepay_models::validation::FitRating;
use serde::Serialize;
use tabled::Tabled;
use tracing::warn;

use super::{MarketArgs, RunParams};
use crate::cli::OutputFormat;
use crate::input;
use crate::output::{print_document, print_header, print_output, print_warning};

/// Arguments for the calibrate command.
#[derive(Args, Debug)]
pub struct CalibrateArgs {
    /// Credit portfolio CSV
    #[arg(short, long)]
    pub portfolio: PathBuf,

    #[command(flatten)]
    pub params: RunParams,

    #[command(flatten)]
    pub market: MarketArgs,
}

#[derive(Tabled, Serialize)]
struct CalibrationRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Speed")]
    speed: String,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "σ")]
    sigma: String,
    #[tabled(rename = "σ stressed")]
    sigma_stressed: String,
    #[tabled(rename = "r0")]
    r0: String,
    #[tabled(rename = "Converged")]
    converged: bool,
    #[tabled(rename = "R²")]
    r_squared: String,
    #[tabled(rename = "Rating")]
    rating: String,
}

impl From<&Calibration> for CalibrationRow {
    fn from(c: &Calibration) -> Self {
        let (speed, level, r0) = match &c.parameters.base {
            ModelParameters::Vasicek(p) => (p.kappa, format!("θ={:.6}", p.theta), p.r0),
            ModelParameters::HullWhite(p) => (p.a, format!("λ={:.6}", p.lambda), p.r0),
        };
        Self {
            key: c.key.clone(),
            speed: format!("{speed:.6}"),
            level,
            sigma: format!("{:.6}", c.parameters.base.sigma()),
            sigma_stressed: format!("{:.6}", c.parameters.stressed.sigma()),
            r0: format!("{r0:.6}"),
            converged: c.parameters.base.converged(),
            r_squared: c
                .fit
                .map_or_else(|| "-".to_string(), |m| format!("{:.4}", m.r_squared)),
            rating: c.fit.map_or_else(
                || "-".to_string(),
                |m| FitRating::from_r_squared(m.r_squared).label().to_string(),
            ),
        }
    }
}

/// Executes the calibrate command.
pub fn execute(args: CalibrateArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = args.params.resolve()?;
    let credits = input::load_portfolio(&args.portfolio)?;
    let market = args.market.load(config.model, false)?;
    let coordinator = PipelineCoordinator::new(config, market)?;

    let mut seen = BTreeSet::new();
    let mut calibrations = Vec::new();
    let mut failures = Vec::new();
    for credit in &credits {
        match coordinator.calibrate(credit) {
            Ok(c) => {
                if seen.insert(c.key.clone()) {
                    calibrations.push(c);
                }
            }
            Err(e) => {
                warn!(credit_id = %credit.id, error = %e, "calibration failed");
                failures.push(format!("{}: {e}", credit.id));
            }
        }
    }

    match format {
        OutputFormat::Json => print_document(&calibrations)?,
        OutputFormat::Csv => {
            let rows: Vec<CalibrationRow> = calibrations.iter().map(Into::into).collect();
            print_output(&rows, format)?;
        }
        OutputFormat::Table => {
            print_header(&format!("Calibration ({})", coordinator.model_kind()));
            let rows: Vec<CalibrationRow> = calibrations.iter().map(Into::into).collect();
            print_output(&rows, format)?;
        }
    }

    for failure in &failures {
        print_warning(failure);
    }
    Ok(())
}
