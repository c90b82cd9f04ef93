//! Constant-installment (annuity) schedule.

use crate::error::PrepayResult;
use crate::types::{round_cents, CashFlowRow, CashFlowSchedule, Credit};

/// Constant installment `P·i(1+i)^n / ((1+i)^n − 1)` at the periodic rate
/// equivalent to the contractual EA rate.
pub fn french_schedule(credit: &Credit) -> PrepayResult<CashFlowSchedule> {
    let n = credit.installments;
    let i = credit.frequency.periodic_rate(credit.rate);
    let installment = if i.abs() < f64::EPSILON {
        credit.principal / f64::from(n)
    } else {
        let growth = (1.0 + i).powi(n as i32);
        credit.principal * i * growth / (growth - 1.0)
    };

    let mut schedule = CashFlowSchedule::with_capacity(n as usize);
    let mut balance = credit.principal;
    for k in 1..=n {
        let interest = balance * i;
        let principal = installment - interest;
        balance -= principal;

        let date = credit.frequency.installment_date(credit.disbursement, k)?;
        let mut row = CashFlowRow::new(
            date,
            round_cents(principal),
            round_cents(interest),
            round_cents(balance.max(0.0)),
        );
        row.total = round_cents(installment);
        schedule.push(row);
    }
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::fixtures;
    use crate::types::{AmortizationType, Date};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_principal_sums_to_notional() {
        let credit = fixtures::credit(AmortizationType::French, 12);
        let schedule = french_schedule(&credit).unwrap();

        assert_eq!(schedule.len(), 12);
        assert_abs_diff_eq!(schedule.total_principal(), 1_000_000.0, epsilon = 0.1);
        assert_abs_diff_eq!(schedule.as_slice()[11].remaining_balance, 0.0, epsilon = 0.01);
    }

    #[test]
    fn test_installment_is_constant_and_interest_decreases() {
        let credit = fixtures::credit(AmortizationType::French, 24);
        let schedule = french_schedule(&credit).unwrap();
        let rows = schedule.as_slice();

        let first = rows[0].total;
        assert!(rows.iter().all(|r| (r.total - first).abs() < 1e-9));
        assert!(rows.windows(2).all(|w| w[1].interest < w[0].interest));
    }

    #[test]
    fn test_first_row() {
        let credit = fixtures::credit(AmortizationType::French, 12);
        let schedule = french_schedule(&credit).unwrap();
        let row = schedule.as_slice()[0];

        let i = (1.12f64).powf(1.0 / 12.0) - 1.0;
        assert_eq!(row.payment_date, Date::from_ymd(2025, 2, 15).unwrap());
        assert_abs_diff_eq!(row.interest, 1_000_000.0 * i, epsilon = 0.01);
    }

    #[test]
    fn test_zero_rate() {
        let mut credit = fixtures::credit(AmortizationType::French, 4);
        credit.rate = 0.0;
        let schedule = french_schedule(&credit).unwrap();
        assert!(schedule.iter().all(|r| r.principal == 250_000.0 && r.interest == 0.0));
    }
}
