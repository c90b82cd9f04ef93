//! CLI command implementations.

pub mod bands;
pub mod calibrate;
pub mod config;
pub mod run;
pub mod schedule;

pub use bands::BandsArgs;
pub use calibrate::CalibrateArgs;
pub use config::ConfigArgs;
pub use run::RunArgs;
pub use schedule::ScheduleArgs;

use std::path::PathBuf;

use clap::Args;
use prepay_core::Date;
use prepay_engine::{MarketData, PipelineConfig};
use prepay_models::model::ModelKind;
use prepay_models::paths::InterpolationMode;

use crate::error::{CliError, CliResult};
use crate::input;

/// Parses a date in YYYY-MM-DD or DD/MM/YYYY form.
pub fn parse_date(s: &str) -> CliResult<Date> {
    Date::parse(s).map_err(|_| CliError::InvalidDate(s.to_string()))
}

/// Run parameters, from a TOML file and/or flags. Flags win.
#[derive(Args, Debug, Clone)]
pub struct RunParams {
    /// TOML run configuration
    #[arg(long, env = "PREPAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Valuation cut-off date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub cutoff: Option<Date>,

    /// Short-rate model (vasicek or hull-white)
    #[arg(long)]
    pub model: Option<ModelKind>,

    /// Monte Carlo paths per regime
    #[arg(short = 'n', long)]
    pub simulations: Option<usize>,

    /// Base RNG seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Prepayment rate differential in percentage points
    #[arg(short, long)]
    pub differential: Option<f64>,

    /// Path interpolation (short or ea)
    #[arg(long)]
    pub interpolation: Option<InterpolationMode>,
}

impl RunParams {
    /// Builds the configuration and checks it.
    pub fn resolve(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match (&self.config, self.cutoff) {
            (Some(path), _) => PipelineConfig::load(path)?,
            (None, Some(cutoff)) => PipelineConfig::new(cutoff),
            (None, None) => {
                return Err(CliError::MissingArgument("--cutoff or --config".into()).into())
            }
        };
        if let Some(cutoff) = self.cutoff {
            config.cutoff = cutoff;
        }
        if let Some(model) = self.model {
            config = config.with_model(model);
        }
        if let Some(n) = self.simulations {
            config = config.with_simulations(n);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(pct) = self.differential {
            config = config.with_differential_pct(pct);
        }
        if let Some(mode) = self.interpolation {
            config = config.with_interpolation(mode);
        }
        config.ensure_valid()?;
        Ok(config)
    }
}

/// Market data files.
#[derive(Args, Debug, Clone)]
pub struct MarketArgs {
    /// Weekly market rates by product category (Vasicek)
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Dated curve snapshots by day node (Hull-White)
    #[arg(long)]
    pub curve_history: Option<PathBuf>,

    /// Risk-free discount curves by currency
    #[arg(long)]
    pub risk_free: Option<PathBuf>,
}

impl MarketArgs {
    /// Loads what the selected model needs. Discount curves are optional
    /// for calibration-only commands.
    pub fn load(&self, model: ModelKind, need_curves: bool) -> anyhow::Result<MarketData> {
        let mut market = MarketData::default();
        match model {
            ModelKind::Vasicek => {
                let path = self
                    .history
                    .as_ref()
                    .ok_or_else(|| CliError::MissingArgument("--history".into()))?;
                market.history = Some(input::load_history(path)?);
            }
            ModelKind::HullWhite => {
                let path = self
                    .curve_history
                    .as_ref()
                    .ok_or_else(|| CliError::MissingArgument("--curve-history".into()))?;
                market.curve_history = Some(input::load_curve_history(path)?);
            }
        }
        match &self.risk_free {
            Some(path) => market.risk_free = input::load_risk_free(path)?,
            None if need_curves => {
                return Err(CliError::MissingArgument("--risk-free".into()).into())
            }
            None => {}
        }
        Ok(market)
    }
}
