//! Weight records and the learning rule

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Maximum number of correctness outcomes kept per agent
pub const HISTORY_CAPACITY: usize = 512;

/// Inclusive bounds for a learned weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for WeightBounds {
    fn default() -> Self {
        Self { min: 0.1, max: 5.0 }
    }
}

impl WeightBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, weight: f64) -> f64 {
        weight.max(self.min).min(self.max)
    }
}

/// Exponential-moving-average update toward the latest correctness outcome
///
/// `new = (1 - lr) * old + lr * correct`, clamped to the bounds.
///
/// # Example
///
/// ```
/// use consensus_domain::weights::{LearningRule, WeightBounds};
///
/// let rule = LearningRule::new(0.2, WeightBounds::default());
/// assert!((rule.apply(1.0, true) - 1.0).abs() < 1e-12);
/// assert!((rule.apply(1.0, false) - 0.8).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningRule {
    pub learning_rate: f64,
    pub bounds: WeightBounds,
}

impl Default for LearningRule {
    fn default() -> Self {
        Self {
            learning_rate: 0.2,
            bounds: WeightBounds::default(),
        }
    }
}

impl LearningRule {
    pub fn new(learning_rate: f64, bounds: WeightBounds) -> Self {
        Self {
            learning_rate,
            bounds,
        }
    }

    pub fn with_bounds(self, bounds: WeightBounds) -> Self {
        Self { bounds, ..self }
    }

    pub fn apply(&self, old: f64, correct: bool) -> f64 {
        let target = if correct { 1.0 } else { 0.0 };
        let updated = (1.0 - self.learning_rate) * old + self.learning_rate * target;
        self.bounds.clamp(updated)
    }
}

/// Reliability state of a single agent
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeightRecord {
    pub weight: f64,
    history: VecDeque<u8>,
}

impl WeightRecord {
    pub fn new(weight: f64) -> Self {
        Self {
            weight,
            history: VecDeque::new(),
        }
    }

    /// Append a 0/1 outcome, evicting the oldest past [`HISTORY_CAPACITY`]
    pub fn push_outcome(&mut self, correct: bool) {
        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(u8::from(correct));
    }

    pub fn history(&self) -> &VecDeque<u8> {
        &self.history
    }

    /// Fraction of recorded outcomes that were correct
    pub fn accuracy(&self) -> Option<f64> {
        if self.history.is_empty() {
            return None;
        }
        let correct: usize = self.history.iter().map(|&c| c as usize).sum();
        Some(correct as f64 / self.history.len() as f64)
    }
}

/// All known agents' weights and histories, keyed by agent id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightTable {
    records: BTreeMap<String, WeightRecord>,
}

impl WeightTable {
    /// Build from a persisted weight map (histories start empty)
    pub fn from_weights(weights: BTreeMap<String, f64>) -> Self {
        Self {
            records: weights
                .into_iter()
                .map(|(id, w)| (id, WeightRecord::new(w)))
                .collect(),
        }
    }

    pub fn weight(&self, agent_id: &str) -> Option<f64> {
        self.records.get(agent_id).map(|r| r.weight)
    }

    pub fn record(&self, agent_id: &str) -> Option<&WeightRecord> {
        self.records.get(agent_id)
    }

    /// Snapshot of agent id → weight
    pub fn weights(&self) -> BTreeMap<String, f64> {
        self.records
            .iter()
            .map(|(id, r)| (id.clone(), r.weight))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert `base_weight` for an unseen agent; returns `true` if inserted
    pub fn ensure(&mut self, agent_id: &str, base_weight: f64) -> bool {
        if self.records.contains_key(agent_id) {
            return false;
        }
        self.records
            .insert(agent_id.to_string(), WeightRecord::new(base_weight));
        true
    }

    /// Record one outcome and apply the learning rule; returns the new weight
    ///
    /// Agents not seen before start from a weight of 1.0.
    pub fn record_outcome(&mut self, agent_id: &str, correct: bool, rule: &LearningRule) -> f64 {
        let record = self
            .records
            .entry(agent_id.to_string())
            .or_insert_with(|| WeightRecord::new(1.0));
        record.push_outcome(correct);
        record.weight = rule.apply(record.weight, correct);
        record.weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_converges_toward_bounds() {
        let rule = LearningRule::new(0.2, WeightBounds::new(0.1, 5.0));

        let mut w = 1.0;
        for _ in 0..200 {
            w = rule.apply(w, false);
        }
        assert!((w - 0.1).abs() < 1e-9);

        // Correct answers pull toward 1.0 (the EMA target), never past max
        let mut w = 0.1;
        let mut previous = w;
        for _ in 0..50 {
            w = rule.apply(w, true);
            assert!(w >= previous);
            previous = w;
        }
        assert!(w <= 5.0);
        assert!((w - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_ema_decays_high_prior_toward_one_when_correct() {
        let rule = LearningRule::default();
        let w = rule.apply(4.0, true);
        assert!((w - 3.4).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_to_max() {
        let rule = LearningRule::new(0.5, WeightBounds::new(0.1, 0.9));
        assert_eq!(rule.apply(0.9, true), 0.9);
    }

    #[test]
    fn test_history_bounded() {
        let mut record = WeightRecord::new(1.0);
        record.push_outcome(false);
        for _ in 0..HISTORY_CAPACITY {
            record.push_outcome(true);
        }
        assert_eq!(record.history().len(), HISTORY_CAPACITY);
        // the initial `false` was evicted on the 513th append
        assert!(record.history().iter().all(|&c| c == 1));
        assert_eq!(record.accuracy(), Some(1.0));
    }

    #[test]
    fn test_table_ensure_only_inserts_once() {
        let mut table = WeightTable::default();
        assert!(table.ensure("a", 2.0));
        assert!(!table.ensure("a", 3.0));
        assert_eq!(table.weight("a"), Some(2.0));
    }

    #[test]
    fn test_record_outcome_unknown_agent_starts_at_one() {
        let mut table = WeightTable::default();
        let w = table.record_outcome("new", false, &LearningRule::default());
        assert!((w - 0.8).abs() < 1e-12);
        assert_eq!(table.record("new").unwrap().history().len(), 1);
    }

    #[test]
    fn test_from_weights() {
        let table = WeightTable::from_weights(BTreeMap::from([("a".to_string(), 1.5)]));
        assert_eq!(table.weights().get("a"), Some(&1.5));
        assert_eq!(table.record("a").unwrap().accuracy(), None);
    }
}
