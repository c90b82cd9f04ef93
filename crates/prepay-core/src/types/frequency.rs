//! Installment frequency.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PrepayError, PrepayResult};
use crate::types::Date;

/// Installment frequency of an amortizing credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentFrequency {
    /// Every 15 days (24 per year)
    Biweekly,
    /// Monthly payments (12 per year)
    #[default]
    Monthly,
    /// Every two months (6 per year)
    Bimonthly,
    /// Quarterly payments (4 per year)
    Quarterly,
    /// Semi-annual payments (2 per year)
    SemiAnnual,
    /// Annual payments (1 per year)
    Annual,
}

impl PaymentFrequency {
    /// Returns the number of installments per year.
    #[must_use]
    pub fn periods_per_year(&self) -> u32 {
        match self {
            PaymentFrequency::Biweekly => 24,
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Bimonthly => 6,
            PaymentFrequency::Quarterly => 4,
            PaymentFrequency::SemiAnnual => 2,
            PaymentFrequency::Annual => 1,
        }
    }

    /// Periodic rate equivalent to an effective-annual rate.
    #[must_use]
    pub fn periodic_rate(&self, effective_annual: f64) -> f64 {
        (1.0 + effective_annual).powf(1.0 / f64::from(self.periods_per_year())) - 1.0
    }

    /// Date of installment `n` (1-based) counted from `start`.
    ///
    /// Biweekly installments step 15 calendar days; the others step whole
    /// months from the anchor so that end-of-month clamping does not drift.
    pub fn installment_date(&self, start: Date, n: u32) -> PrepayResult<Date> {
        match self {
            PaymentFrequency::Biweekly => Ok(start.add_days(15 * i64::from(n))),
            _ => {
                let months = 12 / self.periods_per_year() * n;
                start.add_months(months as i32)
            }
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentFrequency::Biweekly => "Biweekly",
            PaymentFrequency::Monthly => "Monthly",
            PaymentFrequency::Bimonthly => "Bimonthly",
            PaymentFrequency::Quarterly => "Quarterly",
            PaymentFrequency::SemiAnnual => "Semi-Annual",
            PaymentFrequency::Annual => "Annual",
        };
        write!(f, "{name}")
    }
}

impl FromStr for PaymentFrequency {
    type Err = PrepayError;

    /// Accepts English names and the Spanish labels used in portfolio files.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quincenal" | "biweekly" => Ok(PaymentFrequency::Biweekly),
            "mensual" | "monthly" => Ok(PaymentFrequency::Monthly),
            "bimestral" | "bimonthly" => Ok(PaymentFrequency::Bimonthly),
            "trimestral" | "quarterly" => Ok(PaymentFrequency::Quarterly),
            "semestral" | "semiannual" | "semi-annual" => Ok(PaymentFrequency::SemiAnnual),
            "anual" | "annual" => Ok(PaymentFrequency::Annual),
            _ => Err(PrepayError::unknown_variant("payment frequency", s)),
        }
    }
}
