//! Constant-principal schedule.

use crate::error::PrepayResult;
use crate::types::{round_cents, CashFlowRow, CashFlowSchedule, Credit};

/// Equal principal `P/n` each period plus interest on the outstanding balance.
pub fn german_schedule(credit: &Credit) -> PrepayResult<CashFlowSchedule> {
    let n = credit.installments;
    let i = credit.frequency.periodic_rate(credit.rate);
    let principal = credit.principal / f64::from(n);

    let mut schedule = CashFlowSchedule::with_capacity(n as usize);
    let mut balance = credit.principal;
    for k in 1..=n {
        let interest = round_cents(balance * i);
        balance = round_cents(balance - principal).max(0.0);

        let date = credit.frequency.installment_date(credit.disbursement, k)?;
        let mut row = CashFlowRow::new(date, principal, interest, balance);
        row.total = round_cents(principal + interest);
        schedule.push(row);
    }
    Ok(schedule)
}
