//! Domain layer for agent-consensus
//!
//! This crate contains the consensus core: answer normalization, agreement
//! scoring, the voting strategies, the weight-learning rule and the topic
//! router. It performs no I/O and has no dependencies on infrastructure or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! ## Agents
//!
//! An agent is one independent, unreliable answer source. Each query round
//! yields one [`AgentResponse`] per agent: an extracted answer, a confidence
//! and a guess of what the group will converge on.
//!
//! ## Consensus
//!
//! Responses are grouped by their normalized answer and combined by a
//! [`Strategy`] into an [`AggregationResult`]. An empty answer in the result
//! means there were no valid votes.
//!
//! ## Reliability
//!
//! Per-agent weights are learned from ground-truth feedback with an
//! exponential moving average ([`weights::LearningRule`]).

pub mod agent;
pub mod config;
pub mod consensus;
pub mod core;
pub mod prompt;
pub mod routing;
pub mod weights;

// Re-export commonly used types
pub use agent::{
    AgentDescriptor, AgentQueryRequest, AgentResponse, GENERAL_TAG, QueryStage, SamplingParams,
    validation::{ConfigIssue, ConfigIssueCode, Severity},
};
pub use config::OutputFormat;
pub use consensus::{
    AggregationResult, Strategy, aggregate, inverse_surprising_popularity, majority_vote,
    normalize_answer, normalize_value, pairwise_agreement, token_f1, topic_weighted_vote,
    weighted_vote,
};
pub use core::{error::DomainError, question::Question};
pub use prompt::PromptTemplate;
pub use routing::{GENERAL_TOPIC, RouteDecision, TopicRouter};
pub use weights::{LearningRule, WeightBounds, WeightTable};
