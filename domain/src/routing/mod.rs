//! Topic routing
//!
//! Keyword-based topic detection and selection of the agents believed
//! competent for a question's topic.

pub mod topic;

pub use topic::{GENERAL_TOPIC, RouteDecision, TopicRouter};
