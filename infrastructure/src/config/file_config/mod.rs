//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain and application
//! types on demand.

mod agents;
mod global;
mod output;

pub use agents::FileAgentEntry;
pub use global::FileGlobalConfig;
pub use output::FileOutputConfig;

use consensus_application::ConsensusConfig;
use consensus_domain::AgentDescriptor;
use consensus_domain::agent::validation::{
    ConfigIssue, ConfigIssueCode, validate_agents, validate_learning_rate, validate_weight_bounds,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Timeouts, learning rule and file locations
    pub global: FileGlobalConfig,
    /// The agent panel
    pub agents: Vec<FileAgentEntry>,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks the agent panel (ids, models, weights, tags), the learning
    /// rule and the default strategy name.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Agent panel
        issues.extend(validate_agents(&self.agent_descriptors()));
        for entry in &self.agents {
            if entry.topic_tags.iter().all(|t| t.trim().is_empty()) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::EmptyTopicTags {
                        id: entry.id.clone(),
                    },
                    format!(
                        "agents.{}: topic_tags is empty, treated as [\"general\"]",
                        entry.id
                    ),
                ));
            }
        }

        // 2. Learning rule
        issues.extend(validate_weight_bounds(
            self.global.min_weight,
            self.global.max_weight,
        ));
        issues.extend(validate_learning_rate(self.global.weight_learning_rate));

        // 3. Enum parse validation
        issues.extend(self.global.parse_default_strategy().1);

        issues
    }

    /// Every configured agent as a domain descriptor
    pub fn agent_descriptors(&self) -> Vec<AgentDescriptor> {
        self.agents.iter().map(FileAgentEntry::to_descriptor).collect()
    }

    /// Use case parameters derived from `[global]`
    pub fn consensus_config(&self) -> ConsensusConfig {
        let global = &self.global;
        ConsensusConfig::default()
            .with_learning_rate(global.weight_learning_rate)
            .with_bounds(global.min_weight, global.max_weight)
            .with_query_timeout(Some(Duration::from_secs(global.request_timeout_s)))
            .with_debate_timeout(Some(Duration::from_secs(
                global.effective_debate_timeout_s(),
            )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_domain::OutputFormat;
    use consensus_domain::agent::validation::{Severity, has_errors};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[global]
request_timeout_s = 60
weight_learning_rate = 0.3
weights_path = "/tmp/weights.json"

[[agents]]
id = "llama"
model = "llama3.1:8b"
host = "10.0.0.11"
topic_tags = ["math"]

[[agents]]
id = "qwen"
model = "qwen2.5:7b"
port = 11500
base_weight = 1.5
enabled = false

[output]
format = "full"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.global.request_timeout_s, 60);
        assert_eq!(config.global.weights_path, "/tmp/weights.json");
        assert_eq!(config.global.max_weight, 5.0);
        assert_eq!(config.agents.len(), 2);
        assert_eq!(config.agents[1].port, 11500);
        assert_eq!(config.output.format, Some(OutputFormat::Full));
        assert!(!config.output.color);

        let agents = config.agent_descriptors();
        assert_eq!(agents[0].host, "10.0.0.11");
        assert!(agents[0].has_tag("math"));
        assert!(!agents[1].enabled);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert!(config.agents.is_empty());
        assert_eq!(config.global.weight_learning_rate, 0.2);
        assert!(config.output.color);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_consensus_config_from_global() {
        let config: FileConfig = toml::from_str(
            r#"
[global]
request_timeout_s = 40
weight_learning_rate = 0.5
min_weight = 0.2
max_weight = 2.0
"#,
        )
        .unwrap();

        let consensus = config.consensus_config();
        assert_eq!(consensus.learning_rule.learning_rate, 0.5);
        assert_eq!(consensus.learning_rule.bounds.min, 0.2);
        assert_eq!(consensus.query_timeout, Some(Duration::from_secs(40)));
        assert_eq!(consensus.debate_timeout, Some(Duration::from_secs(40)));
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let config: FileConfig = toml::from_str(
            r#"
[global]
min_weight = 3.0
max_weight = 1.0
weight_learning_rate = 0.0
default_strategy = "borda"

[[agents]]
id = "a"
model = "m"
topic_tags = []

[[agents]]
id = "a"
model = ""
"#,
        )
        .unwrap();

        let issues = config.validate();
        assert!(has_errors(&issues));
        let codes: Vec<_> = issues.iter().map(|i| &i.code).collect();
        assert!(codes.contains(&&ConfigIssueCode::DuplicateAgentId { id: "a".to_string() }));
        assert!(codes.contains(&&ConfigIssueCode::EmptyModel { id: "a".to_string() }));
        assert!(codes.contains(&&ConfigIssueCode::EmptyTopicTags { id: "a".to_string() }));
        assert!(codes.contains(&&ConfigIssueCode::InvalidWeightBounds));
        assert!(codes.contains(&&ConfigIssueCode::InvalidLearningRate));
        assert!(
            issues
                .iter()
                .any(|i| i.severity == Severity::Warning
                    && matches!(i.code, ConfigIssueCode::InvalidEnumValue { .. }))
        );
    }
}
