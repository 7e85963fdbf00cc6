//! Validation of the configured agent panel.
//!
//! Detects descriptor sets that cannot work (duplicate ids, missing model
//! names) or that will behave unexpectedly (negative prior weights, all
//! agents disabled), and reports them as structured issues.
//!
//! # Examples
//!
//! ```
//! use consensus_domain::AgentDescriptor;
//! use consensus_domain::agent::validation::{validate_agents, Severity};
//!
//! let agents = vec![
//!     AgentDescriptor::new("a", "llama3.1:8b"),
//!     AgentDescriptor::new("a", "qwen2.5:7b"),
//! ];
//! let issues = validate_agents(&agents);
//! assert_eq!(issues[0].severity, Severity::Error);
//! ```

use super::descriptor::AgentDescriptor;
use std::collections::HashSet;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// An agent has an empty id.
    EmptyAgentId,
    /// Two agents share the same id.
    DuplicateAgentId { id: String },
    /// An agent has no model name.
    EmptyModel { id: String },
    /// An agent has a negative or non-finite base weight.
    InvalidBaseWeight { id: String },
    /// No agent is enabled.
    NoEnabledAgents,
    /// Weight bounds are inverted or out of range.
    InvalidWeightBounds,
    /// The learning rate is outside (0, 1].
    InvalidLearningRate,
    /// An agent entry lists no topic tags.
    EmptyTopicTags { id: String },
    /// A string field has an unrecognized value.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }
}

/// Validate a set of agent descriptors.
pub fn validate_agents(agents: &[AgentDescriptor]) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for agent in agents {
        if agent.id.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyAgentId,
                "agents: an agent has an empty id",
            ));
            continue;
        }
        if !seen.insert(agent.id.as_str()) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::DuplicateAgentId {
                    id: agent.id.clone(),
                },
                format!("agents: duplicate agent id '{}'", agent.id),
            ));
        }
        if agent.model.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyModel {
                    id: agent.id.clone(),
                },
                format!("agents.{}: model must not be empty", agent.id),
            ));
        }
        if !agent.base_weight.is_finite() || agent.base_weight < 0.0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidBaseWeight {
                    id: agent.id.clone(),
                },
                format!(
                    "agents.{}: base_weight {} is invalid, treated as 0.0",
                    agent.id, agent.base_weight
                ),
            ));
        }
    }

    if !agents.is_empty() && agents.iter().all(|a| !a.enabled) {
        issues.push(ConfigIssue::warning(
            ConfigIssueCode::NoEnabledAgents,
            "agents: every agent is disabled; queries will fail",
        ));
    }

    issues
}

/// Validate the learned-weight bounds.
pub fn validate_weight_bounds(min_weight: f64, max_weight: f64) -> Option<ConfigIssue> {
    if !min_weight.is_finite() || !max_weight.is_finite() || min_weight < 0.0 || min_weight > max_weight
    {
        return Some(ConfigIssue::error(
            ConfigIssueCode::InvalidWeightBounds,
            format!(
                "global: weight bounds [{}, {}] are invalid (need 0 <= min <= max)",
                min_weight, max_weight
            ),
        ));
    }
    None
}

/// Validate the EMA learning rate.
pub fn validate_learning_rate(learning_rate: f64) -> Option<ConfigIssue> {
    if learning_rate.is_finite() && learning_rate > 0.0 && learning_rate <= 1.0 {
        return None;
    }
    Some(ConfigIssue::error(
        ConfigIssueCode::InvalidLearningRate,
        format!(
            "global: weight_learning_rate {} is invalid (need 0 < rate <= 1)",
            learning_rate
        ),
    ))
}

/// Check whether any issue is fatal.
pub fn has_errors(issues: &[ConfigIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}
