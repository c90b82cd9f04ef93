//! In-memory caches for the pricing pipeline.

use std::sync::Arc;

use dashmap::DashMap;
use prepay_models::paths::Regime;

use crate::scenario::PrepaidCashFlowScenario;

/// Cache key: one credit in one regime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScenarioKey {
    /// Credit identifier.
    pub credit_id: String,
    /// Volatility regime.
    pub regime: Regime,
}

impl ScenarioKey {
    /// Creates a key.
    pub fn new(credit_id: impl Into<String>, regime: Regime) -> Self {
        Self {
            credit_id: credit_id.into(),
            regime,
        }
    }
}

/// Triggered prepayment scenarios by credit and regime.
#[derive(Debug, Default)]
pub struct ScenarioCache {
    entries: DashMap<ScenarioKey, Arc<Vec<PrepaidCashFlowScenario>>>,
}

impl ScenarioCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the scenarios of a key, replacing any previous entry.
    pub fn insert(&self, key: ScenarioKey, scenarios: Vec<PrepaidCashFlowScenario>) -> Arc<Vec<PrepaidCashFlowScenario>> {
        let shared = Arc::new(scenarios);
        self.entries.insert(key, Arc::clone(&shared));
        shared
    }

    /// Get the scenarios of a key.
    pub fn get(&self, key: &ScenarioKey) -> Option<Arc<Vec<PrepaidCashFlowScenario>>> {
        self.entries.get(key).map(|e| Arc::clone(e.value()))
    }

    /// Get the scenarios of a credit in a regime.
    pub fn get_credit(&self, credit_id: &str, regime: Regime) -> Option<Arc<Vec<PrepaidCashFlowScenario>>> {
        self.get(&ScenarioKey::new(credit_id, regime))
    }

    /// Drop every entry of a credit.
    pub fn invalidate_credit(&self, credit_id: &str) {
        self.entries.retain(|k, _| k.credit_id != credit_id);
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prepay_core::{CashFlowSchedule, Currency, Date};

    fn scenario(id: &str, regime: Regime) -> PrepaidCashFlowScenario {
        PrepaidCashFlowScenario {
            credit_id: id.into(),
            regime,
            simulation_index: 1,
            is_bullet: false,
            trigger_date: Date::from_ymd(2025, 1, 1).unwrap(),
            currency: Currency::COP,
            schedule: CashFlowSchedule::new(),
        }
    }

    #[test]
    fn test_insert_get_and_invalidate() {
        let cache = ScenarioCache::new();
        for id in ["A", "B"] {
            for regime in Regime::ALL {
                cache.insert(ScenarioKey::new(id, regime), vec![scenario(id, regime)]);
            }
        }
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.get_credit("A", Regime::Stressed).unwrap()[0].regime, Regime::Stressed);

        cache.invalidate_credit("A");
        assert_eq!(cache.len(), 2);
        assert!(cache.get_credit("A", Regime::Base).is_none());
        assert!(cache.get_credit("B", Regime::Base).is_some());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_replaces() {
        let cache = ScenarioCache::new();
        let key = ScenarioKey::new("A", Regime::Base);
        cache.insert(key.clone(), vec![scenario("A", Regime::Base)]);
        cache.insert(key.clone(), Vec::new());
        assert!(cache.get(&key).unwrap().is_empty());
        assert_eq!(cache.len(), 1);
    }
}
