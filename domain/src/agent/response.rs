//! Agent response value object

use crate::consensus::normalize::normalize_answer;
use serde::{Deserialize, Serialize};

/// Confidence assumed when an agent did not report one
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// One agent's answer for one query round
///
/// Produced by the agent query collaborator and never mutated once it has
/// been handed to aggregation. A transport failure is represented as a
/// response with an `error` and an empty `answer`, which contributes no vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Id of the agent that produced this response
    pub agent_id: String,
    /// Model that actually served the request
    pub model_id: String,
    /// Unprocessed text returned by the backend
    pub raw_text: String,
    /// Extracted candidate answer (possibly empty)
    pub answer: String,
    /// The agent's guess of the group's eventual answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_majority: Option<String>,
    /// Self-reported confidence in [0, 1]
    pub confidence: f64,
    /// Wall-clock latency of the query in milliseconds
    pub latency_ms: f64,
    /// Tokens generated by the backend
    pub token_count: usize,
    /// Transport or backend error, if the query failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentResponse {
    /// Create a response carrying an answer
    pub fn answered(
        agent_id: impl Into<String>,
        model_id: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            model_id: model_id.into(),
            raw_text: String::new(),
            answer: answer.into(),
            predicted_majority: None,
            confidence: DEFAULT_CONFIDENCE,
            latency_ms: 0.0,
            token_count: 0,
            error: None,
        }
    }

    /// Create an error-carrying response with an empty answer
    pub fn failure(
        agent_id: impl Into<String>,
        model_id: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            model_id: model_id.into(),
            raw_text: String::new(),
            answer: String::new(),
            predicted_majority: None,
            confidence: 0.0,
            latency_ms: 0.0,
            token_count: 0,
            error: Some(error.into()),
        }
    }

    /// Set confidence, clamped to [0, 1] (NaN becomes 0)
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = clamp_unit(confidence);
        self
    }

    pub fn with_predicted_majority(mut self, predicted: impl Into<String>) -> Self {
        self.predicted_majority = Some(predicted.into());
        self
    }

    pub fn with_raw_text(mut self, raw_text: impl Into<String>) -> Self {
        self.raw_text = raw_text.into();
        self
    }

    pub fn with_latency_ms(mut self, latency_ms: f64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_token_count(mut self, token_count: usize) -> Self {
        self.token_count = token_count;
        self
    }

    /// Returns `true` if the query itself succeeded
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Confidence clamped to [0, 1], regardless of how the struct was built
    pub fn clamped_confidence(&self) -> f64 {
        clamp_unit(self.confidence)
    }

    /// Canonical form of the answer, used for grouping
    pub fn normalized_answer(&self) -> String {
        normalize_answer(&self.answer)
    }

    /// Canonical predicted-majority guess, falling back to the agent's own answer
    pub fn normalized_predicted_majority(&self) -> String {
        let predicted = self
            .predicted_majority
            .as_deref()
            .map(normalize_answer)
            .unwrap_or_default();
        if predicted.is_empty() {
            self.normalized_answer()
        } else {
            predicted
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
