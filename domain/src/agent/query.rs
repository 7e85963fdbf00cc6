//! Query request value objects passed to the agent query collaborator

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which phase of a consensus request a query belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStage {
    /// Single-round query for the direct strategies
    Direct,
    /// First debate round
    Round1,
    /// Peer-informed second debate round
    Round2,
}

impl QueryStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStage::Direct => "direct",
            QueryStage::Round1 => "round1",
            QueryStage::Round2 => "round2",
        }
    }
}

impl std::fmt::Display for QueryStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sampling parameters shared by every query of one request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f64,
    pub seed: u64,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            seed: 42,
            max_tokens: 64,
        }
    }
}

impl SamplingParams {
    /// Same parameters with the seed shifted by `offset` (wrapping)
    pub fn offset_seed(self, offset: u64) -> Self {
        Self {
            seed: self.seed.wrapping_add(offset),
            ..self
        }
    }
}

/// A single prompt for a single agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentQueryRequest {
    pub prompt: String,
    pub params: SamplingParams,
    pub stage: QueryStage,
    /// Upper bound the query backend applies to this request
    #[serde(skip)]
    pub timeout: Option<Duration>,
}

impl AgentQueryRequest {
    pub fn new(prompt: impl Into<String>, params: SamplingParams, stage: QueryStage) -> Self {
        Self {
            prompt: prompt.into(),
            params,
            stage,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}
