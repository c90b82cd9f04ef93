//! Restructured cash flows of triggered simulation paths.

use prepay_core::{CashFlowSchedule, Currency, Date};
use prepay_models::paths::Regime;
use serde::{Deserialize, Serialize};

/// The schedule a credit follows on one simulation path that triggered
/// prepayment.
///
/// Rows before `trigger_date` are the contractual ones; the last row is
/// dated `trigger_date` and carries the prepaid principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaidCashFlowScenario {
    /// Credit identifier.
    pub credit_id: String,
    /// Volatility regime of the path.
    pub regime: Regime,
    /// One-based index of the path within its simulation.
    pub simulation_index: usize,
    /// Whether the credit is a single-payment credit.
    pub is_bullet: bool,
    /// Date of the first trigger on the path.
    pub trigger_date: Date,
    /// Currency of the credit.
    pub currency: Currency,
    /// Restructured schedule.
    pub schedule: CashFlowSchedule,
}

impl PrepaidCashFlowScenario {
    /// Amount prepaid on the terminal row.
    #[must_use]
    pub fn prepaid_amount(&self) -> f64 {
        self.schedule.iter().map(|r| r.prepayment).sum()
    }

    /// Sum of all flows of the restructured schedule.
    #[must_use]
    pub fn total_flow(&self) -> f64 {
        self.schedule.total()
    }
}
