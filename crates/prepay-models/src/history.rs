//! Historical market-rate series by product category.

use std::collections::BTreeMap;

use prepay_core::{Date, ProductCategory};
use prepay_curves::conversion::normalize_percent;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Dated effective-annual observations, one column per product category.
///
/// Missing observations are stored as NaN and skipped by
/// [`HistoricalRateSeries::observations`]. Each column is normalized from
/// percent to decimals independently.
///
/// # Example
///
/// ```rust
/// use prepay_core::{Date, ProductCategory};
/// use prepay_models::history::HistoricalRateSeries;
///
/// let dates = vec![
///     Date::from_ymd(2024, 1, 5).unwrap(),
///     Date::from_ymd(2024, 1, 12).unwrap(),
/// ];
/// let series = HistoricalRateSeries::new(dates)
///     .unwrap()
///     .with_category(ProductCategory::Consumo, vec![24.5, 24.8])
///     .unwrap();
///
/// let obs = series.observations(ProductCategory::Consumo, None);
/// assert!((obs[1].1 - 0.248).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRateSeries {
    dates: Vec<Date>,
    columns: BTreeMap<ProductCategory, Vec<f64>>,
}

impl HistoricalRateSeries {
    /// Creates a series over `dates`.
    ///
    /// # Errors
    ///
    /// Fails if `dates` is empty or not strictly increasing.
    pub fn new(dates: Vec<Date>) -> ModelResult<Self> {
        if dates.is_empty() {
            return Err(ModelError::invalid_input("historical rate series has no dates"));
        }
        if let Some(i) = dates.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ModelError::invalid_input(format!(
                "historical dates must be strictly increasing: {} then {}",
                dates[i],
                dates[i + 1]
            )));
        }
        Ok(Self {
            dates,
            columns: BTreeMap::new(),
        })
    }

    /// Adds the EA column of a category.
    ///
    /// # Errors
    ///
    /// Fails if the column length differs from the date count or any finite
    /// rate is at or below -100%.
    pub fn with_category(mut self, category: ProductCategory, mut rates: Vec<f64>) -> ModelResult<Self> {
        if rates.len() != self.dates.len() {
            return Err(ModelError::invalid_input(format!(
                "{category} column has {} values for {} dates",
                rates.len(),
                self.dates.len()
            )));
        }
        normalize_percent(&mut rates);
        if let Some(bad) = rates.iter().find(|r| r.is_finite() && **r <= -1.0) {
            return Err(ModelError::invalid_input(format!(
                "{category} rate {bad} is not above -100%"
            )));
        }
        self.columns.insert(category, rates);
        Ok(self)
    }

    /// Observation dates.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Categories with a column, in a stable order.
    pub fn categories(&self) -> impl Iterator<Item = ProductCategory> + '_ {
        self.columns.keys().copied()
    }

    /// `true` if the category has a column.
    #[must_use]
    pub fn has_category(&self, category: ProductCategory) -> bool {
        self.columns.contains_key(&category)
    }

    /// Last observation date on or before `cutoff`.
    #[must_use]
    pub fn effective_cutoff(&self, cutoff: Date) -> Option<Date> {
        self.dates
            .partition_point(|d| *d <= cutoff)
            .checked_sub(1)
            .map(|i| self.dates[i])
    }

    /// Non-missing `(date, EA)` observations of a category, optionally
    /// limited to dates on or before `until`.
    #[must_use]
    pub fn observations(&self, category: ProductCategory, until: Option<Date>) -> Vec<(Date, f64)> {
        let Some(column) = self.columns.get(&category) else {
            return Vec::new();
        };
        self.dates
            .iter()
            .zip(column)
            .filter(|(d, r)| r.is_finite() && until.map_or(true, |u| **d <= u))
            .map(|(d, r)| (*d, *r))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: usize) -> Vec<Date> {
        let start = Date::from_ymd(2024, 1, 5).unwrap();
        (0..n).map(|i| start.add_days(7 * i as i64)).collect()
    }

    #[test]
    fn test_observations_skip_missing_and_respect_cutoff() {
        let d = dates(4);
        let series = HistoricalRateSeries::new(d.clone())
            .unwrap()
            .with_category(ProductCategory::Comercial, vec![0.1, f64::NAN, 0.12, 0.13])
            .unwrap();

        let all = series.observations(ProductCategory::Comercial, None);
        assert_eq!(all.len(), 3);

        let until = series.observations(ProductCategory::Comercial, Some(d[2]));
        assert_eq!(until.len(), 2);
        assert_eq!(until[1], (d[2], 0.12));

        assert!(series.observations(ProductCategory::Vivienda, None).is_empty());
    }

    #[test]
    fn test_effective_cutoff() {
        let d = dates(3);
        let series = HistoricalRateSeries::new(d.clone()).unwrap();
        assert_eq!(series.effective_cutoff(d[1].add_days(3)), Some(d[1]));
        assert_eq!(series.effective_cutoff(d[2]), Some(d[2]));
        assert_eq!(series.effective_cutoff(d[0].add_days(-1)), None);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(HistoricalRateSeries::new(vec![]).is_err());
        let d = dates(2);
        assert!(HistoricalRateSeries::new(vec![d[1], d[0]]).is_err());
        assert!(HistoricalRateSeries::new(d.clone())
            .unwrap()
            .with_category(ProductCategory::Consumo, vec![0.1])
            .is_err());
        assert!(HistoricalRateSeries::new(d)
            .unwrap()
            .with_category(ProductCategory::Consumo, vec![0.1, -1.0])
            .is_err());
    }
}
