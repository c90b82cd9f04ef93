//! # Prepay Math
//!
//! Numerical utilities for the Prepay pricing engine.
//!
//! This crate provides:
//!
//! - **Optimization**: bounded Nelder–Mead minimization for likelihood fitting
//! - **Differentiation**: second-order finite differences on uneven grids
//! - **Interpolation**: linear interpolation with flat extension
//! - **Statistics**: goodness-of-fit metrics (R², RMSE, MAE, correlation, bias)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::float_cmp)]

pub mod differentiation;
pub mod error;
pub mod interpolation;
pub mod optimization;
pub mod statistics;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::differentiation::gradient;
    pub use crate::error::{MathError, MathResult};
    pub use crate::interpolation::interp;
    pub use crate::optimization::{
        minimize_bounded, Bounds, OptimizationConfig, OptimizationResult,
    };
    pub use crate::statistics::{mean, pearson, population_std, FitMetrics};
}

pub use error::{MathError, MathResult};
