//! Aggregation manager
//!
//! Applies the voting strategies with the current learned weights and feeds
//! ground-truth outcomes back into the [`WeightStore`].

use super::weight_store::WeightStore;
use crate::ports::weight_repository::WeightStoreError;
use consensus_domain::consensus::voting;
use consensus_domain::{
    AgentDescriptor, AgentResponse, AggregationResult, DomainError, LearningRule, Strategy,
    WeightBounds, normalize_answer,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

pub struct AggregationManager {
    store: Arc<WeightStore>,
    rule: LearningRule,
}

impl AggregationManager {
    pub fn new(store: Arc<WeightStore>, rule: LearningRule) -> Self {
        Self { store, rule }
    }

    pub fn store(&self) -> &Arc<WeightStore> {
        &self.store
    }

    pub fn learning_rule(&self) -> LearningRule {
        self.rule
    }

    /// Give every unseen agent its base weight
    pub fn initialize_weights(&self, agents: &[AgentDescriptor]) -> Result<(), WeightStoreError> {
        self.store.ensure_agents(agents).map(|_| ())
    }

    pub fn majority_vote(&self, responses: &[AgentResponse]) -> AggregationResult {
        voting::majority_vote(responses)
    }

    pub fn weighted_vote(&self, responses: &[AgentResponse]) -> AggregationResult {
        voting::weighted_vote(responses, &self.store.weights())
    }

    pub fn inverse_surprising_popularity(&self, responses: &[AgentResponse]) -> AggregationResult {
        voting::inverse_surprising_popularity(responses)
    }

    pub fn topic_weighted_vote(&self, responses: &[AgentResponse], topic: &str) -> AggregationResult {
        voting::topic_weighted_vote(responses, &self.store.weights(), topic)
    }

    /// Dispatch a single-round strategy
    pub fn aggregate(
        &self,
        strategy: Strategy,
        responses: &[AgentResponse],
        topic: Option<&str>,
    ) -> Result<AggregationResult, DomainError> {
        voting::aggregate(strategy, responses, &self.store.weights(), topic)
    }

    /// Dispatch by strategy name (case-insensitive); unknown names are an error
    pub fn aggregate_by_name(
        &self,
        strategy: &str,
        responses: &[AgentResponse],
        topic: Option<&str>,
    ) -> Result<AggregationResult, DomainError> {
        let strategy: Strategy = strategy.parse()?;
        self.aggregate(strategy, responses, topic)
    }

    /// Learn from an authoritative answer using the configured bounds
    pub fn update_weights_from_ground_truth(
        &self,
        responses: &[AgentResponse],
        ground_truth: &str,
    ) -> Result<BTreeMap<String, f64>, WeightStoreError> {
        self.update_weights_with_bounds(responses, ground_truth, self.rule.bounds)
    }

    /// Learn from an authoritative answer.
    ///
    /// An empty (normalized) ground truth changes nothing and returns the
    /// current weights. Otherwise every response counts as correct when its
    /// normalized answer equals the normalized truth.
    pub fn update_weights_with_bounds(
        &self,
        responses: &[AgentResponse],
        ground_truth: &str,
        bounds: WeightBounds,
    ) -> Result<BTreeMap<String, f64>, WeightStoreError> {
        let truth = normalize_answer(ground_truth);
        if truth.is_empty() {
            debug!("Empty ground truth, weights unchanged");
            return Ok(self.store.weights());
        }

        let rule = self.rule.with_bounds(bounds);
        let answers: Vec<(String, String)> = responses
            .iter()
            .map(|r| (r.agent_id.clone(), r.normalized_answer()))
            .collect();
        let correct = answers.iter().filter(|(_, a)| *a == truth).count();

        let weights = self.store.record_outcomes(
            answers.iter().map(|(id, answer)| (id.as_str(), *answer == truth)),
            &rule,
        )?;

        info!(
            "Weights updated from ground truth '{}': {}/{} correct",
            truth,
            correct,
            answers.len()
        );
        Ok(weights)
    }
}
