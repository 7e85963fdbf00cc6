//! Record Feedback use case
//!
//! Learns from an authoritative answer supplied after the fact, given the
//! answer each agent gave.

use crate::aggregation::AggregationManager;
use crate::ports::query_logger::{NoQueryLogger, QueryEvent, QueryLogger};
use crate::ports::weight_repository::WeightStoreError;
use consensus_domain::AgentResponse;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Input for the RecordFeedback use case
#[derive(Debug, Clone)]
pub struct RecordFeedbackInput {
    pub ground_truth: String,
    /// agent id → the answer that agent gave
    pub agent_answers: BTreeMap<String, String>,
}

impl RecordFeedbackInput {
    pub fn new(ground_truth: impl Into<String>) -> Self {
        Self {
            ground_truth: ground_truth.into(),
            agent_answers: BTreeMap::new(),
        }
    }

    pub fn with_answer(mut self, agent_id: impl Into<String>, answer: impl Into<String>) -> Self {
        self.agent_answers.insert(agent_id.into(), answer.into());
        self
    }
}

pub struct RecordFeedbackUseCase {
    manager: Arc<AggregationManager>,
    logger: Arc<dyn QueryLogger>,
}

impl RecordFeedbackUseCase {
    pub fn new(manager: Arc<AggregationManager>) -> Self {
        Self {
            manager,
            logger: Arc::new(NoQueryLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn QueryLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Apply the feedback; returns the weights after the update
    pub fn execute(
        &self,
        input: RecordFeedbackInput,
    ) -> Result<BTreeMap<String, f64>, WeightStoreError> {
        let responses: Vec<AgentResponse> = input
            .agent_answers
            .iter()
            .map(|(agent_id, answer)| AgentResponse::answered(agent_id, "", answer))
            .collect();

        let weights = self
            .manager
            .update_weights_from_ground_truth(&responses, &input.ground_truth)?;

        self.logger.log(QueryEvent::new(
            "feedback",
            json!({
                "ground_truth": input.ground_truth,
                "agent_answers": input.agent_answers,
                "weights": weights,
            }),
        ));
        Ok(weights)
    }
}
