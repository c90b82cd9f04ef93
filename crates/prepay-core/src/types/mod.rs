//! Domain types for loan portfolios.
//!
//! - [`Date`]: Calendar date
//! - [`Currency`]: Portfolio currencies (COP, USD, UVR)
//! - [`PaymentFrequency`]: Installment frequency
//! - [`Credit`]: A loan record with its [`AmortizationType`] and [`ProductCategory`]
//! - [`CashFlowRow`] / [`CashFlowSchedule`]: Dated installments

mod cashflow;
mod credit;
mod currency;
mod date;
mod frequency;

pub use cashflow::{round_cents, CashFlowRow, CashFlowSchedule};
pub use credit::{AmortizationType, Credit, ProductCategory};
pub use currency::Currency;
pub use date::Date;
pub use frequency::PaymentFrequency;
