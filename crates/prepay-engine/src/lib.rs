//! # Prepay Engine
//!
//! The prepayment pricing pipeline.
//!
//! This crate provides:
//! - [`PrepaymentEngine`]: path-by-path trigger detection and restructuring
//! - [`present_value`]: normative band discounting
//! - [`CreditValuation`]: base and stressed present values with deltas
//! - [`ScenarioCache`]: triggered scenarios keyed by credit and regime
//! - [`ValidationReport`]: per-entity fit, global averages and traffic light
//! - [`PipelineCoordinator`]: runs a portfolio end to end
//!
//! ## Architecture
//!
//! ```text
//! Credit ─> Schedule ─────────────────────────┐
//!                                             │
//! Market ─> RateModel ─┬─> Base paths ─────┬─> PrepaymentEngine ─> Scenarios
//!                      │                   │                          │
//!                      └─> Stressed paths ─┘                          │
//!                                                                     v
//! Risk-free curves ─> Base + 6 stressed curves ─────────────> CreditValuation
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let config = PipelineConfig::load("run.toml")?;
//! let market = MarketData { history: Some(history), curve_history: None, risk_free };
//! let coordinator = PipelineCoordinator::new(config, market)?;
//! let output = coordinator.run(&credits)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod discount;
pub mod error;
pub mod pipeline;
pub mod prepayment;
pub mod report;
pub mod scenario;
pub mod sensitivity;

// Re-exports
pub use cache::{ScenarioCache, ScenarioKey};
pub use config::{OptimizerSettings, PipelineConfig, Validate, ValidationError};
pub use discount::{assign_bands, mean_present_value, present_value, BandedCashFlow, CurrencyCurves};
pub use error::{EngineError, EngineResult};
pub use pipeline::{
    Calibration, CreditFailure, CreditResult, MarketData, PipelineCoordinator, PipelineOutput,
};
pub use prepayment::{
    bullet_evaluation_dates, find_trigger, restructure_amortizing, restructure_bullet,
    PrepaymentEngine,
};
pub use report::{
    ConsolidatedRow, CreditValidation, EntityValidation, GlobalAverages, ValidationReport,
};
pub use scenario::PrepaidCashFlowScenario;
pub use sensitivity::{CreditValuation, ScenarioValue};
