//! Consensus parameters - use case behavior control.
//!
//! [`ConsensusConfig`] groups the static parameters the use cases need:
//! the weight-learning rule and the per-query timeouts handed to the query
//! backend with each request. These are application-layer concerns; the
//! infrastructure config loader builds one from the TOML file.

use consensus_domain::{LearningRule, WeightBounds};
use std::time::Duration;

/// Use case behavior parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusConfig {
    /// EMA rule applied on ground-truth feedback.
    pub learning_rule: LearningRule,
    /// Timeout for each single-round agent query.
    pub query_timeout: Option<Duration>,
    /// Timeout for each agent query inside a debate round.
    pub debate_timeout: Option<Duration>,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            learning_rule: LearningRule::default(),
            query_timeout: Some(Duration::from_secs(180)),
            debate_timeout: Some(Duration::from_secs(75)),
        }
    }
}

impl ConsensusConfig {
    // ==================== Builder Methods ====================

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rule.learning_rate = learning_rate;
        self
    }

    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.learning_rule = self.learning_rule.with_bounds(WeightBounds::new(min, max));
        self
    }

    pub fn with_query_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn with_debate_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.debate_timeout = timeout;
        self
    }
}
