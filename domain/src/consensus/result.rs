//! Aggregation result value object

use super::strategy::Strategy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Metadata key carrying the explanation of an empty result
pub const ERROR_KEY: &str = "error";

/// Outcome of one aggregation call
///
/// An empty `answer` means no valid votes were available; the reason is
/// recorded under `metadata["error"]`. Callers must treat the empty answer
/// as the failure signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    /// Strategy that produced this result
    pub strategy: Strategy,
    /// Winning normalized answer (empty when there were no valid votes)
    pub answer: String,
    /// Score per candidate answer, in strategy-specific units
    pub scores: BTreeMap<String, f64>,
    /// Fraction of agreeing agent pairs
    pub agreement_rate: f64,
    /// Agents whose normalized answer equals the winner, in response order
    pub winning_agents: Vec<String>,
    /// Strategy-specific auxiliary facts
    pub metadata: Map<String, Value>,
}

impl AggregationResult {
    /// Result for a round without any usable vote
    pub fn no_votes(strategy: Strategy, reason: impl Into<String>) -> Self {
        let mut metadata = Map::new();
        metadata.insert(ERROR_KEY.to_string(), Value::String(reason.into()));
        Self {
            strategy,
            answer: String::new(),
            scores: BTreeMap::new(),
            agreement_rate: 0.0,
            winning_agents: Vec::new(),
            metadata,
        }
    }

    /// Returns `true` if a winning answer was produced
    pub fn has_answer(&self) -> bool {
        !self.answer.is_empty()
    }

    /// Explanation recorded for an empty result, if any
    pub fn error(&self) -> Option<&str> {
        self.metadata.get(ERROR_KEY).and_then(Value::as_str)
    }

    /// Whether all answering agents agreed
    pub fn is_unanimous(&self) -> bool {
        self.has_answer() && self.agreement_rate >= 1.0
    }

    /// Score of a candidate answer, if it was scored
    pub fn score(&self, answer: &str) -> Option<f64> {
        self.scores.get(answer).copied()
    }

    pub(crate) fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}
