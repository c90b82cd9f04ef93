//! # Prepay Models
//!
//! Short-rate models for the Prepay pricing engine.
//!
//! - **Vasicek**: Ornstein-Uhlenbeck short rate calibrated per product
//!   category on weekly market-rate histories, simulated weekly
//! - **Hull-White**: one-factor model calibrated per credit on curve
//!   snapshot histories, with a time-dependent drift reproducing the
//!   cut-off forward curve, simulated daily
//! - **Paths**: seeded Monte Carlo output in base and stressed regimes,
//!   interpolated to arbitrary payment dates
//! - **Validation**: one-step-ahead R², RMSE, MAE and a traffic-light rating
//!
//! Both models implement [`RateModel`](model::RateModel), which is the only
//! surface the pricing pipeline depends on.
//!
//! ## Example
//!
//! ```rust
//! use prepay_core::Date;
//! use prepay_models::prelude::*;
//!
//! let params = VasicekParameters {
//!     kappa: 0.3,
//!     theta: 0.05,
//!     sigma: 0.02,
//!     r0: 0.06,
//!     anchor: Date::from_ymd(2025, 1, 3).unwrap(),
//!     converged: true,
//! };
//! let paths = prepay_models::vasicek::simulate_paths(&params, 52, 100, 42).unwrap();
//! assert_eq!(paths.n_steps(), 53);
//! assert_eq!(paths.n_paths(), 100);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::float_cmp)]

pub mod error;
pub mod history;
pub mod hull_white;
pub mod model;
pub mod paths;
pub mod validation;
pub mod vasicek;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ModelError, ModelResult};
    pub use crate::history::HistoricalRateSeries;
    pub use crate::hull_white::{HullWhiteModel, HullWhiteParameters};
    pub use crate::model::{
        CalibratedPair, CalibrationRequest, ModelKind, ModelParameters, RateModel,
        SimulationSpec, DEFAULT_SEED, STRESS_FACTOR,
    };
    pub use crate::paths::{InterpolationMode, PathMatrix, Regime};
    pub use crate::validation::{hull_white_fit, vasicek_fit, FitRating};
    pub use crate::vasicek::{VasicekModel, VasicekParameters};
}

pub use error::{ModelError, ModelResult};
