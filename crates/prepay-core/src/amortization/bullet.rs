//! Single-payment schedule.

use crate::types::{round_cents, CashFlowRow, CashFlowSchedule, Credit};

/// One row at maturity carrying the principal and the interest compounded
/// at the EA rate over `days/365` years.
#[must_use]
pub fn bullet_schedule(credit: &Credit) -> CashFlowSchedule {
    let years = credit.disbursement.days_between(&credit.maturity) as f64 / 365.0;
    let final_amount = credit.principal * (1.0 + credit.rate).powf(years);

    let mut row = CashFlowRow::new(
        credit.maturity,
        round_cents(credit.principal),
        round_cents(final_amount - credit.principal),
        0.0,
    );
    row.total = round_cents(final_amount);
    std::iter::once(row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::fixtures;
    use crate::types::{AmortizationType, Date};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_compound_accrual_to_maturity() {
        let mut credit = fixtures::credit(AmortizationType::Bullet, 1);
        credit.disbursement = Date::from_ymd(2025, 1, 1).unwrap();
        credit.maturity = Date::from_ymd(2027, 1, 1).unwrap();

        let schedule = bullet_schedule(&credit);
        let row = schedule.as_slice()[0];
        let years = 730.0 / 365.0;

        assert_eq!(schedule.len(), 1);
        assert_eq!(row.payment_date, credit.maturity);
        assert_abs_diff_eq!(row.total, 1_000_000.0 * 1.12f64.powf(years), epsilon = 0.01);
        assert_eq!(row.remaining_balance, 0.0);
    }
}
