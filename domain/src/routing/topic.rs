//! Keyword topic router

use crate::agent::{AgentDescriptor, GENERAL_TAG};
use serde::{Deserialize, Serialize};

/// Topic assigned when no single topic clearly matches
pub const GENERAL_TOPIC: &str = "general";

/// Outcome of routing a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDecision {
    /// Detected topic (`general` when nothing matched)
    pub topic: String,
    /// Selected agents, highest base weight first
    pub agents: Vec<AgentDescriptor>,
}

impl RouteDecision {
    pub fn agent_ids(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.id.as_str()).collect()
    }
}

/// Routes queries to topic-competent agents using a fixed keyword table
///
/// # Example
///
/// ```
/// use consensus_domain::{AgentDescriptor, TopicRouter};
///
/// let router = TopicRouter::default();
/// assert_eq!(router.detect_topic("Solve this equation: 2x = 4"), "math");
/// assert_eq!(router.detect_topic("Tell me a joke"), "general");
///
/// let agents = vec![
///     AgentDescriptor::new("coder", "m").with_topic_tags(["coding"]),
///     AgentDescriptor::new("mathy", "m").with_topic_tags(["math"]),
/// ];
/// let decision = router.route("calculate the proof", &agents, None);
/// assert_eq!(decision.topic, "math");
/// assert_eq!(decision.agent_ids(), vec!["mathy"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TopicRouter {
    topic_keywords: Vec<(String, Vec<String>)>,
}

/// Built-in topic table, matched in this order
const DEFAULT_TOPICS: &[(&str, &[&str])] = &[
    (
        "math",
        &["math", "algebra", "equation", "calculate", "number", "proof", "gsm8k"],
    ),
    (
        "factual",
        &["who", "when", "where", "capital", "history", "fact", "truthful", "truthfulqa"],
    ),
    (
        "science",
        &["biology", "chemistry", "physics", "scientific", "experiment", "mmlu"],
    ),
    (
        "coding",
        &["python", "code", "algorithm", "function", "debug", "program"],
    ),
    (
        "reasoning",
        &["why", "reason", "logic", "infer", "deduce", "explain"],
    ),
];

impl Default for TopicRouter {
    fn default() -> Self {
        Self::new(DEFAULT_TOPICS.iter().copied())
    }
}

impl TopicRouter {
    /// Build a router from (topic, keywords) pairs; keywords are matched lowercased
    pub fn new<'a, I>(table: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [&'a str])>,
    {
        Self {
            topic_keywords: table
                .into_iter()
                .map(|(topic, keys)| {
                    (
                        topic.to_string(),
                        keys.iter().map(|k| k.to_lowercase()).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Known topics, in table order
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.topic_keywords.iter().map(|(t, _)| t.as_str())
    }

    /// Detect the query's topic.
    ///
    /// Each topic scores the number of its keywords that occur as substrings
    /// of the lowercased query. The strictly highest nonzero score wins; a tie
    /// for the top score, or no match at all, yields `general`.
    pub fn detect_topic(&self, query: &str) -> &str {
        let text = query.to_lowercase();

        let mut best: Option<&str> = None;
        let mut best_score = 0usize;
        let mut tied = false;

        for (topic, keys) in &self.topic_keywords {
            let score = keys.iter().filter(|k| text.contains(k.as_str())).count();
            if score == 0 {
                continue;
            }
            if score > best_score {
                best = Some(topic.as_str());
                best_score = score;
                tied = false;
            } else if score == best_score {
                tied = true;
            }
        }

        match best {
            Some(topic) if !tied => topic,
            _ => GENERAL_TOPIC,
        }
    }

    /// Select the agents for a query.
    ///
    /// Never fails: when no enabled agent carries the topic (or `general`)
    /// tag, every enabled agent is selected. Agents are ordered by base weight
    /// descending, keeping input order between equal weights, and truncated to
    /// `max_agents` when that is positive.
    pub fn route(
        &self,
        query: &str,
        agents: &[AgentDescriptor],
        max_agents: Option<usize>,
    ) -> RouteDecision {
        let topic = self.detect_topic(query).to_string();
        let enabled = || agents.iter().filter(|a| a.enabled);

        let mut candidates: Vec<AgentDescriptor> = if topic == GENERAL_TOPIC {
            enabled().cloned().collect()
        } else {
            enabled()
                .filter(|a| a.has_tag(&topic) || a.has_tag(GENERAL_TAG))
                .cloned()
                .collect()
        };
        if candidates.is_empty() {
            candidates = enabled().cloned().collect();
        }

        // `sort_by` is stable, so equal weights keep their input order.
        candidates.sort_by(|a, b| b.base_weight.total_cmp(&a.base_weight));

        if let Some(limit) = max_agents
            && limit > 0
        {
            candidates.truncate(limit);
        }

        RouteDecision {
            topic,
            agents: candidates,
        }
    }
}
