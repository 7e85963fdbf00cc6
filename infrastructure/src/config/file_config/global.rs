//! Global configuration from TOML (`[global]` section)

use consensus_domain::Strategy;
use consensus_domain::agent::validation::{ConfigIssue, ConfigIssueCode, Severity};
use serde::{Deserialize, Serialize};

/// Raw global configuration from TOML
///
/// # Example
///
/// ```toml
/// [global]
/// request_timeout_s = 180
/// debate_timeout_s = 75
/// weight_learning_rate = 0.2
/// min_weight = 0.1
/// max_weight = 5.0
/// weights_path = "logs/agent_weights.json"
/// query_log_path = "logs/query_metrics.jsonl"   # "" disables the query log
/// default_strategy = "majority"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGlobalConfig {
    /// Per-query timeout for direct requests
    pub request_timeout_s: u64,
    /// Per-query timeout inside debate rounds (capped by `request_timeout_s`)
    pub debate_timeout_s: u64,
    pub weight_learning_rate: f64,
    pub min_weight: f64,
    pub max_weight: f64,
    /// JSON file holding the learned weights
    pub weights_path: String,
    /// JSONL file receiving one record per request
    pub query_log_path: String,
    /// Strategy used when the CLI gets no `--strategy`
    pub default_strategy: String,
}

impl Default for FileGlobalConfig {
    fn default() -> Self {
        Self {
            request_timeout_s: 180,
            debate_timeout_s: 75,
            weight_learning_rate: 0.2,
            min_weight: 0.1,
            max_weight: 5.0,
            weights_path: "logs/agent_weights.json".to_string(),
            query_log_path: "logs/query_metrics.jsonl".to_string(),
            default_strategy: Strategy::Majority.as_str().to_string(),
        }
    }
}

impl FileGlobalConfig {
    /// Parse default_strategy into Strategy, returning warnings on failure.
    pub fn parse_default_strategy(&self) -> (Strategy, Vec<ConfigIssue>) {
        match self.default_strategy.parse::<Strategy>() {
            Ok(strategy) => (strategy, vec![]),
            Err(_) => {
                let issue = ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::InvalidEnumValue {
                        field: "global.default_strategy".to_string(),
                        value: self.default_strategy.clone(),
                        valid_values: Strategy::all()
                            .iter()
                            .map(|s| s.as_str().to_string())
                            .collect(),
                    },
                    message: format!(
                        "global.default_strategy: unknown value '{}', falling back to 'majority'",
                        self.default_strategy
                    ),
                };
                (Strategy::default(), vec![issue])
            }
        }
    }

    /// Timeout applied inside debate rounds
    pub fn effective_debate_timeout_s(&self) -> u64 {
        self.debate_timeout_s.min(self.request_timeout_s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_strategy() {
        let config = FileGlobalConfig {
            default_strategy: "ISP".to_string(),
            ..Default::default()
        };
        let (strategy, issues) = config.parse_default_strategy();
        assert_eq!(strategy, Strategy::Isp);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_parse_unknown_strategy_warns() {
        let config = FileGlobalConfig {
            default_strategy: "borda".to_string(),
            ..Default::default()
        };
        let (strategy, issues) = config.parse_default_strategy();
        assert_eq!(strategy, Strategy::Majority);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_debate_timeout_capped_by_request_timeout() {
        let config = FileGlobalConfig {
            request_timeout_s: 30,
            ..Default::default()
        };
        assert_eq!(config.effective_debate_timeout_s(), 30);
        assert_eq!(FileGlobalConfig::default().effective_debate_timeout_s(), 75);
    }
}
