//! Contractual amortization schedules.
//!
//! Each generator turns a [`Credit`] into its contractual
//! [`CashFlowSchedule`]. Amounts are rounded to cents as rows are produced.
//! Installment dates are counted from the disbursement date at the credit's
//! [`PaymentFrequency`](crate::types::PaymentFrequency).

mod american;
mod bullet;
mod french;
mod german;

pub use american::american_schedule;
pub use bullet::bullet_schedule;
pub use french::french_schedule;
pub use german::german_schedule;

use tracing::debug;

use crate::error::PrepayResult;
use crate::types::{AmortizationType, CashFlowSchedule, Credit};

/// Generates the contractual schedule of a credit according to its
/// amortization type.
pub fn generate_schedule(credit: &Credit) -> PrepayResult<CashFlowSchedule> {
    credit.validate()?;
    let schedule = match credit.amortization {
        AmortizationType::French => french_schedule(credit)?,
        AmortizationType::German => german_schedule(credit)?,
        AmortizationType::American => american_schedule(credit)?,
        AmortizationType::Bullet => bullet_schedule(credit),
    };
    debug!(
        credit_id = %credit.id,
        amortization = %credit.amortization,
        rows = schedule.len(),
        "generated contractual schedule"
    );
    Ok(schedule)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_by_type() {
        let french = fixtures::credit(AmortizationType::French, 12);
        assert_eq!(generate_schedule(&french).unwrap().len(), 12);

        let bullet = fixtures::credit(AmortizationType::Bullet, 12);
        assert_eq!(generate_schedule(&bullet).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_credit_is_rejected() {
        let mut credit = fixtures::credit(AmortizationType::German, 12);
        credit.installments = 0;
        assert!(generate_schedule(&credit).is_err());
    }
}
