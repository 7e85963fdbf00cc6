//! Agent descriptor entity

use serde::{Deserialize, Serialize};

/// Topic tag that makes an agent eligible for every routed topic
pub const GENERAL_TAG: &str = "general";

/// Static description of one agent in the panel
///
/// Created from configuration and immutable during a run, apart from the
/// `enabled` flag which a reload may flip.
///
/// # Example
///
/// ```
/// use consensus_domain::AgentDescriptor;
///
/// let agent = AgentDescriptor::new("agent-1", "llama3.1:8b")
///     .with_base_weight(1.5)
///     .with_topic_tags(["math", "reasoning"]);
/// assert!(agent.has_tag("math"));
/// assert!(!agent.has_tag("coding"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Unique agent identifier
    pub id: String,
    /// Host of the model backend
    pub host: String,
    /// Port of the model backend
    pub port: u16,
    /// Model identifier served by the backend
    pub model: String,
    /// Default sampling temperature for this agent
    pub temperature: f64,
    /// Default generation budget for this agent
    pub max_tokens: u32,
    /// Prior reliability before any learned adjustment
    pub base_weight: f64,
    /// Topics this agent is considered competent for (never empty)
    pub topic_tags: Vec<String>,
    /// Whether this agent takes part in queries
    pub enabled: bool,
}

impl AgentDescriptor {
    /// Create a descriptor with default location, weight and tags
    pub fn new(id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            host: "127.0.0.1".to_string(),
            port: 11434,
            model: model.into(),
            temperature: 0.2,
            max_tokens: 256,
            base_weight: 1.0,
            topic_tags: vec![GENERAL_TAG.to_string()],
            enabled: true,
        }
    }

    pub fn with_endpoint(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Set the prior reliability (negative values are raised to zero)
    pub fn with_base_weight(mut self, weight: f64) -> Self {
        self.base_weight = weight.max(0.0);
        self
    }

    /// Replace topic tags; an empty list falls back to `general`
    pub fn with_topic_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut collected: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.into();
            if !collected.contains(&tag) {
                collected.push(tag);
            }
        }
        if collected.is_empty() {
            collected.push(GENERAL_TAG.to_string());
        }
        self.topic_tags = collected;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Check whether the agent carries the given topic tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.topic_tags.iter().any(|t| t == tag)
    }

    /// Base URL of the agent's backend
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let agent = AgentDescriptor::new("a", "m");
        assert_eq!(agent.topic_tags, vec!["general".to_string()]);
        assert!(agent.enabled);
        assert_eq!(agent.base_weight, 1.0);
        assert_eq!(agent.endpoint(), "http://127.0.0.1:11434");
    }

    #[test]
    fn test_empty_tags_fall_back_to_general() {
        let agent = AgentDescriptor::new("a", "m").with_topic_tags(Vec::<String>::new());
        assert!(agent.has_tag(GENERAL_TAG));
    }

    #[test]
    fn test_duplicate_tags_collapse() {
        let agent = AgentDescriptor::new("a", "m").with_topic_tags(["math", "math", "science"]);
        assert_eq!(agent.topic_tags.len(), 2);
    }

    #[test]
    fn test_negative_base_weight_clamped() {
        let agent = AgentDescriptor::new("a", "m").with_base_weight(-2.0);
        assert_eq!(agent.base_weight, 0.0);
    }
}
