//! Interest-only schedule with principal at the last installment.

use crate::error::PrepayResult;
use crate::types::{round_cents, CashFlowRow, CashFlowSchedule, Credit};

/// Constant interest each period; the full principal is repaid with the
/// final installment.
pub fn american_schedule(credit: &Credit) -> PrepayResult<CashFlowSchedule> {
    let n = credit.installments;
    let i = credit.frequency.periodic_rate(credit.rate);
    let interest = round_cents(credit.principal * i);
    let principal = round_cents(credit.principal);

    let mut schedule = CashFlowSchedule::with_capacity(n as usize);
    for k in 1..=n {
        let date = credit.frequency.installment_date(credit.disbursement, k)?;
        let row = if k == n {
            CashFlowRow::new(date, principal, interest, 0.0)
        } else {
            CashFlowRow::new(date, 0.0, interest, principal)
        };
        schedule.push(row);
    }
    Ok(schedule)
}
