//! Goodness-of-fit report of a run.
//!
//! Metrics are computed once per calibration entity (the product category for
//! Vasicek, the credit for Hull-White) and expanded to every credit that
//! shares the entity.

use std::collections::BTreeMap;

use prepay_math::statistics::{mean, FitMetrics};
use prepay_models::model::ModelKind;
use prepay_models::validation::FitRating;
use serde::{Deserialize, Serialize};

/// Label of the overall traffic-light entry.
pub const GLOBAL_LABEL: &str = "GLOBAL";

/// Fit of one calibration entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityValidation {
    /// Category label or credit identifier.
    pub entity: String,
    /// Fit metrics.
    pub metrics: FitMetrics,
    /// Rating by R².
    pub rating: FitRating,
}

/// Fit metrics attributed to a credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditValidation {
    /// Credit identifier.
    pub credit_id: String,
    /// Entity the metrics were computed for.
    pub entity: String,
    /// Fit metrics.
    pub metrics: FitMetrics,
    /// Rating by R².
    pub rating: FitRating,
}

/// Averages across entities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalAverages {
    /// Mean R².
    pub mean_r_squared: f64,
    /// Mean RMSE.
    pub mean_rmse: f64,
    /// Mean MAE.
    pub mean_mae: f64,
    /// Rating of the mean R².
    pub rating: FitRating,
}

/// One-line summary of a model's validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedRow {
    /// Model validated.
    pub model: ModelKind,
    /// Entities validated.
    pub entities: usize,
    /// Entities rated good.
    pub good: usize,
    /// Entities rated acceptable.
    pub acceptable: usize,
    /// Entities rated poor.
    pub poor: usize,
    /// Averages, absent when nothing was validated.
    pub averages: Option<GlobalAverages>,
}

/// Per-entity and per-credit fit of one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    model: ModelKind,
    entities: BTreeMap<String, EntityValidation>,
    credits: Vec<CreditValidation>,
}

impl ValidationReport {
    /// Empty report for `model`.
    #[must_use]
    pub fn new(model: ModelKind) -> Self {
        Self {
            model,
            entities: BTreeMap::new(),
            credits: Vec::new(),
        }
    }

    /// Attributes `metrics` of `entity` to a credit.
    ///
    /// The first metrics recorded for an entity are the ones reported for it.
    pub fn record(&mut self, credit_id: &str, entity: &str, metrics: FitMetrics) {
        let rating = FitRating::from_r_squared(metrics.r_squared);
        let entry = self
            .entities
            .entry(entity.to_string())
            .or_insert_with(|| EntityValidation {
                entity: entity.to_string(),
                metrics,
                rating,
            });
        self.credits.push(CreditValidation {
            credit_id: credit_id.to_string(),
            entity: entity.to_string(),
            metrics: entry.metrics,
            rating: entry.rating,
        });
    }

    /// Model validated.
    #[must_use]
    pub fn model(&self) -> ModelKind {
        self.model
    }

    /// Entity rows in entity order.
    pub fn entities(&self) -> impl Iterator<Item = &EntityValidation> {
        self.entities.values()
    }

    /// Credit rows in recording order.
    #[must_use]
    pub fn credits(&self) -> &[CreditValidation] {
        &self.credits
    }

    /// `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Mean R², RMSE and MAE across entities.
    #[must_use]
    pub fn global(&self) -> Option<GlobalAverages> {
        if self.entities.is_empty() {
            return None;
        }
        let column = |f: fn(&FitMetrics) -> f64| -> f64 {
            let values: Vec<f64> = self.entities.values().map(|e| f(&e.metrics)).collect();
            mean(&values)
        };
        let mean_r_squared = column(|m| m.r_squared);
        Some(GlobalAverages {
            mean_r_squared,
            mean_rmse: column(|m| m.rmse),
            mean_mae: column(|m| m.mae),
            rating: FitRating::from_r_squared(mean_r_squared),
        })
    }

    /// Rating counts and averages on one row.
    #[must_use]
    pub fn consolidated(&self) -> ConsolidatedRow {
        let count = |r: FitRating| self.entities.values().filter(|e| e.rating == r).count();
        ConsolidatedRow {
            model: self.model,
            entities: self.entities.len(),
            good: count(FitRating::Good),
            acceptable: count(FitRating::Acceptable),
            poor: count(FitRating::Poor),
            averages: self.global(),
        }
    }

    /// Rating per entity followed by the [`GLOBAL_LABEL`] rating.
    #[must_use]
    pub fn traffic_light(&self) -> Vec<(String, FitRating)> {
        let mut lights: Vec<(String, FitRating)> = self
            .entities
            .values()
            .map(|e| (e.entity.clone(), e.rating))
            .collect();
        if let Some(global) = self.global() {
            lights.push((GLOBAL_LABEL.to_string(), global.rating));
        }
        lights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn metrics(r_squared: f64, rmse: f64) -> FitMetrics {
        FitMetrics {
            r_squared,
            rmse,
            mae: rmse / 2.0,
            correlation: r_squared.sqrt(),
            bias: 0.0,
            mape: None,
            n_observations: 50,
        }
    }

    #[test]
    fn test_entity_metrics_expand_to_credits() {
        let mut report = ValidationReport::new(ModelKind::Vasicek);
        report.record("C1", "Consumo", metrics(0.7, 0.01));
        report.record("C2", "Consumo", metrics(0.1, 0.09));
        report.record("C3", "Vivienda", metrics(0.5, 0.03));

        assert_eq!(report.entities().count(), 2);
        assert_eq!(report.credits().len(), 3);
        assert_eq!(report.credits()[1].metrics, metrics(0.7, 0.01));
        assert_eq!(report.credits()[1].rating, FitRating::Good);
        assert_eq!(report.credits()[2].rating, FitRating::Acceptable);
    }

    #[test]
    fn test_global_and_consolidated() {
        let mut report = ValidationReport::new(ModelKind::HullWhite);
        assert!(report.global().is_none());
        assert!(report.traffic_light().is_empty());

        report.record("A", "A", metrics(0.9, 0.01));
        report.record("B", "B", metrics(0.5, 0.03));
        report.record("C", "C", metrics(0.0, 0.05));

        let global = report.global().unwrap();
        assert_relative_eq!(global.mean_r_squared, 1.4 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(global.mean_rmse, 0.03, epsilon = 1e-12);
        assert_relative_eq!(global.mean_mae, 0.015, epsilon = 1e-12);
        assert_eq!(global.rating, FitRating::Acceptable);

        let row = report.consolidated();
        assert_eq!((row.entities, row.good, row.acceptable, row.poor), (3, 1, 1, 1));

        let lights = report.traffic_light();
        assert_eq!(lights.len(), 4);
        assert_eq!(lights[3], (GLOBAL_LABEL.to_string(), FitRating::Acceptable));
    }
}
