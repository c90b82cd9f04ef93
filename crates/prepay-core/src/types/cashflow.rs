//! Cash-flow rows and schedules.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Date;

/// Rounds an amount to cents.
#[must_use]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// One installment of a schedule.
///
/// `prepayment` is zero on contractual schedules; on a restructured
/// schedule it carries the amount prepaid on the terminal row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlowRow {
    /// Payment date
    pub payment_date: Date,
    /// Principal repaid
    pub principal: f64,
    /// Interest paid
    pub interest: f64,
    /// Principal plus interest
    pub total: f64,
    /// Outstanding balance after the payment
    pub remaining_balance: f64,
    /// Prepaid principal
    #[serde(default)]
    pub prepayment: f64,
}

impl CashFlowRow {
    /// Creates a contractual row; `total` is principal plus interest.
    #[must_use]
    pub fn new(payment_date: Date, principal: f64, interest: f64, remaining_balance: f64) -> Self {
        Self {
            payment_date,
            principal,
            interest,
            total: principal + interest,
            remaining_balance,
            prepayment: 0.0,
        }
    }

    /// Sets the prepaid amount on this row.
    #[must_use]
    pub fn with_prepayment(mut self, amount: f64) -> Self {
        self.prepayment = amount;
        self
    }
}

impl fmt::Display for CashFlowRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.2} (principal {:.2}, interest {:.2})",
            self.payment_date, self.total, self.principal, self.interest
        )
    }
}

/// A date-ordered schedule of cash-flow rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSchedule {
    rows: Vec<CashFlowRow>,
}

impl CashFlowSchedule {
    /// Creates a new empty schedule.
    #[must_use]
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Creates a schedule with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
        }
    }

    /// Appends a row.
    pub fn push(&mut self, row: CashFlowRow) {
        self.rows.push(row);
    }

    /// Returns the rows as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[CashFlowRow] {
        &self.rows
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns an iterator over the rows.
    pub fn iter(&self) -> impl Iterator<Item = &CashFlowRow> {
        self.rows.iter()
    }

    /// Sum of principal across rows.
    #[must_use]
    pub fn total_principal(&self) -> f64 {
        self.rows.iter().map(|r| r.principal).sum()
    }

    /// Sum of interest across rows.
    #[must_use]
    pub fn total_interest(&self) -> f64 {
        self.rows.iter().map(|r| r.interest).sum()
    }

    /// Sum of total flows across rows.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.total).sum()
    }

    /// Date of the last row.
    #[must_use]
    pub fn last_date(&self) -> Option<Date> {
        self.rows.last().map(|r| r.payment_date)
    }

    /// Sorts rows by payment date.
    pub fn sort_by_date(&mut self) {
        self.rows.sort_by_key(|r| r.payment_date);
    }

    /// Rows dated on or after `date`.
    #[must_use]
    pub fn on_or_after(&self, date: Date) -> Self {
        self.rows
            .iter()
            .filter(|r| r.payment_date >= date)
            .copied()
            .collect()
    }
}

impl IntoIterator for CashFlowSchedule {
    type Item = CashFlowRow;
    type IntoIter = std::vec::IntoIter<CashFlowRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a CashFlowSchedule {
    type Item = &'a CashFlowRow;
    type IntoIter = std::slice::Iter<'a, CashFlowRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl FromIterator<CashFlowRow> for CashFlowSchedule {
    fn from_iter<I: IntoIterator<Item = CashFlowRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_row_total() {
        let row = CashFlowRow::new(d(2025, 6, 15), 100.0, 2.5, 900.0);
        assert_eq!(row.total, 102.5);
        assert_eq!(row.prepayment, 0.0);
        assert_eq!(row.with_prepayment(900.0).prepayment, 900.0);
    }

    #[test]
    fn test_schedule_totals_and_filter() {
        let schedule: CashFlowSchedule = vec![
            CashFlowRow::new(d(2025, 6, 15), 100.0, 10.0, 200.0),
            CashFlowRow::new(d(2025, 7, 15), 100.0, 5.0, 100.0),
            CashFlowRow::new(d(2025, 8, 15), 100.0, 2.5, 0.0),
        ]
        .into_iter()
        .collect();

        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule.total_principal(), 300.0);
        assert_eq!(schedule.total_interest(), 17.5);
        assert_eq!(schedule.on_or_after(d(2025, 7, 15)).len(), 2);
        assert_eq!(schedule.last_date(), Some(d(2025, 8, 15)));
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(10.004), 10.0);
        assert_eq!(round_cents(10.006), 10.01);
    }
}
