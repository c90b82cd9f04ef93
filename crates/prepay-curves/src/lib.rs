//! # Prepay Curves
//!
//! Rate curves for the Prepay pricing engine.
//!
//! - **Conversion**: effective-annual ↔ continuously-compounded short rates
//!   and percentage auto-normalization
//! - **Discount curves**: per-currency curves with exact/nearest node lookup
//!   and the risk-free table they are built from
//! - **Forward curves**: instantaneous forwards from curve snapshot histories,
//!   used by Hull-White calibration
//! - **Stress**: the six regulatory stressed curves per currency
//!
//! ## Example
//!
//! ```rust
//! use prepay_core::Currency;
//! use prepay_curves::prelude::*;
//!
//! let base = DiscountCurve::from_effective_annual(
//!     Currency::COP,
//!     &[1, 365],
//!     &[1.0 / 365.0, 1.0],
//!     &[0.09, 0.10],
//! )
//! .unwrap();
//! let stressed = StressedCurveSet::build(&base).unwrap();
//! let up = stressed.get(StressScenario::ParallelUp).unwrap();
//! assert!(up.rate_at_node(365).unwrap() > base.rate_at_node(365).unwrap());
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
#![allow(clippy::float_cmp)]

pub mod conversion;
pub mod discount;
pub mod error;
pub mod forward;
pub mod stress;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::conversion::{ea_to_short, normalize_percent, short_to_ea};
    pub use crate::discount::{discount_factor, CurveNode, DiscountCurve, RiskFreeTable};
    pub use crate::error::{CurveError, CurveResult};
    pub use crate::forward::{CurveHistory, ForwardCurve};
    pub use crate::stress::{StressParameters, StressScenario, StressedCurveSet};
}

pub use error::{CurveError, CurveResult};
