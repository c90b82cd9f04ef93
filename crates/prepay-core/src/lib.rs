//! # Prepay Core
//!
//! Core types and deterministic building blocks for the Prepay prepayment
//! risk engine.
//!
//! - **Types**: `Date`, `Currency`, `PaymentFrequency`, `Credit` and
//!   cash-flow schedules
//! - **Amortization**: French, German, American and Bullet contractual schedules
//! - **Bands**: the 19 normative day-count bands and band time factors `t_k`
//! - **Grouping**: aggregation of schedules by month, quarter, semester,
//!   year or band
//!
//! ## Example
//!
//! ```rust
//! use prepay_core::prelude::*;
//!
//! let disbursement = Date::from_ymd(2025, 1, 15).unwrap();
//! let credit = Credit {
//!     id: "C-1".into(),
//!     amortization: AmortizationType::French,
//!     category: ProductCategory::Consumo,
//!     principal: 1_000_000.0,
//!     rate: 0.12,
//!     installments: 12,
//!     disbursement,
//!     maturity: disbursement.add_months(12).unwrap(),
//!     currency: Currency::COP,
//!     frequency: PaymentFrequency::Monthly,
//! };
//! let schedule = generate_schedule(&credit).unwrap();
//! assert_eq!(schedule.len(), 12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::similar_names)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::float_cmp)]

pub mod amortization;
pub mod bands;
pub mod error;
pub mod grouping;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::amortization::generate_schedule;
    pub use crate::bands::{band_for_date, band_for_days, time_band_factor, NormativeBand};
    pub use crate::error::{PrepayError, PrepayResult};
    pub use crate::grouping::{group_schedule, Grouping, PeriodTotals};
    pub use crate::types::{
        AmortizationType, CashFlowRow, CashFlowSchedule, Credit, Currency, Date,
        PaymentFrequency, ProductCategory,
    };
}

pub use error::{PrepayError, PrepayResult};
pub use types::*;
