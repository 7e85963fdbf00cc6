//! Consensus domain
//!
//! Answer normalization, agreement scoring and the single-round voting
//! strategies.
//!
//! # Strategies
//!
//! ```text
//! ┌────────────┬──────────────────────────────────────────────────────┐
//! │ majority   │ most frequent normalized answer                      │
//! │ weighted   │ Σ weight(agent) × confidence per answer              │
//! │ isp        │ actual_share / (predicted_share + ε) per answer      │
//! │ topic      │ weighted vote over topic-routed agents               │
//! │ debate     │ two rounds of majority with peer summary in between  │
//! └────────────┴──────────────────────────────────────────────────────┘
//! ```

pub mod agreement;
pub mod normalize;
pub mod result;
pub mod strategy;
pub mod voting;

pub use agreement::{pairwise_agreement, token_f1};
pub use normalize::{normalize_answer, normalize_value};
pub use result::AggregationResult;
pub use strategy::Strategy;
pub use voting::{
    DEFAULT_AGENT_WEIGHT, ISP_EPSILON, aggregate, inverse_surprising_popularity, majority_vote,
    topic_weighted_vote, weighted_vote,
};
