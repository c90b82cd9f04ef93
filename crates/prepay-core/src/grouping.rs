//! Aggregation of schedules into reporting periods.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::bands::band_for_date;
use crate::error::PrepayError;
use crate::types::{CashFlowSchedule, Date};

/// Reporting period used to aggregate a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Grouping {
    /// One entry per payment date.
    #[default]
    Exact,
    /// Calendar month (`2025-07`).
    Monthly,
    /// Calendar quarter (`2025Q3`).
    Quarterly,
    /// Half-year (`2025-S2`).
    Semiannual,
    /// Calendar year (`2025`).
    Annual,
    /// Normative band number relative to a reference date.
    Band,
}

impl FromStr for Grouping {
    type Err = PrepayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" | "exacta" => Ok(Grouping::Exact),
            "monthly" | "mensual" => Ok(Grouping::Monthly),
            "quarterly" | "trimestral" => Ok(Grouping::Quarterly),
            "semiannual" | "semestral" => Ok(Grouping::Semiannual),
            "annual" | "anual" => Ok(Grouping::Annual),
            "band" | "bands" | "bandas" => Ok(Grouping::Band),
            _ => Err(PrepayError::unknown_variant("grouping", s)),
        }
    }
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Grouping::Exact => "exact",
            Grouping::Monthly => "monthly",
            Grouping::Quarterly => "quarterly",
            Grouping::Semiannual => "semiannual",
            Grouping::Annual => "annual",
            Grouping::Band => "band",
        };
        write!(f, "{name}")
    }
}

/// Aggregated amounts for one reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotals {
    /// Period label.
    pub period: String,
    /// Principal in the period.
    pub principal: f64,
    /// Interest in the period.
    pub interest: f64,
    /// Total flow in the period.
    pub total: f64,
    /// Prepaid amount in the period.
    pub prepayment: f64,
}

/// Sums a schedule by reporting period, in chronological order.
///
/// `reference` is only used by [`Grouping::Band`]; rows beyond the last
/// band are dropped.
#[must_use]
pub fn group_schedule(
    schedule: &CashFlowSchedule,
    grouping: Grouping,
    reference: Date,
) -> Vec<PeriodTotals> {
    let mut groups: BTreeMap<(i64, String), PeriodTotals> = BTreeMap::new();

    for row in schedule {
        let date = row.payment_date;
        let key = match grouping {
            Grouping::Exact => (reference.days_between(&date), date.to_string()),
            Grouping::Monthly => (
                i64::from(date.year()) * 100 + i64::from(date.month()),
                format!("{}-{:02}", date.year(), date.month()),
            ),
            Grouping::Quarterly => (
                i64::from(date.year()) * 10 + i64::from(date.quarter()),
                format!("{}Q{}", date.year(), date.quarter()),
            ),
            Grouping::Semiannual => (
                i64::from(date.year()) * 10 + i64::from(date.semester()),
                format!("{}-S{}", date.year(), date.semester()),
            ),
            Grouping::Annual => (i64::from(date.year()), date.year().to_string()),
            Grouping::Band => match band_for_date(reference, date) {
                Some(band) => (i64::from(band), band.to_string()),
                None => continue,
            },
        };

        let entry = groups.entry(key).or_insert_with_key(|(_, label)| PeriodTotals {
            period: label.clone(),
            principal: 0.0,
            interest: 0.0,
            total: 0.0,
            prepayment: 0.0,
        });
        entry.principal += row.principal;
        entry.interest += row.interest;
        entry.total += row.total;
        entry.prepayment += row.prepayment;
    }

    groups.into_values().collect()
}
