//! Console output formatter for consensus reports

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use consensus_application::{ConsensusReport, HealthReport};
use consensus_domain::{AgentDescriptor, AgentResponse, AggregationResult, ConfigIssue, Severity};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Formats consensus reports and agent tables for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete consensus report
    pub fn format(report: &ConsensusReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Consensus Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Question:".cyan().bold(),
            report.prompt
        ));
        output.push_str(&format!(
            "{} {}   {} {}{}\n",
            "Strategy:".cyan().bold(),
            report.strategy,
            "Topic:".cyan().bold(),
            report.topic,
            if report.mock {
                format!("   {}", "(mock agents)".dimmed())
            } else {
                String::new()
            }
        ));

        if let Some(debate) = &report.debate {
            output.push_str(&Self::section_header("Debate Round 1"));
            output.push_str(&Self::format_responses(&debate.round1));

            if debate.early_stop {
                output.push_str(&format!(
                    "\n{}\n",
                    "Unanimous after round 1, round 2 skipped".dimmed()
                ));
            } else {
                output.push_str(&Self::section_header("Debate Round 2"));
                output.push_str(&Self::format_responses(&debate.round2));
            }
        } else {
            output.push_str(&Self::section_header("Agent Responses"));
            output.push_str(&Self::format_responses(&report.agent_responses));
        }

        output.push_str(&Self::section_header("Consensus"));
        output.push_str(&Self::format_aggregate(&report.aggregate));

        if let Some(aggregates) = &report.aggregates {
            output.push_str(&Self::section_header("All Strategies"));
            for (name, result) in aggregates {
                let answer = if result.has_answer() {
                    result.answer.as_str()
                } else {
                    "(no votes)"
                };
                output.push_str(&format!(
                    "  {:<10} {:<24} agreement {:.2}\n",
                    name.bold(),
                    answer,
                    result.agreement_rate
                ));
            }
        }

        output.push_str(&Self::section_header("Agent Weights"));
        output.push_str(&Self::format_weights(&report.weights));

        output.push_str(&format!(
            "\n{} {:.0} ms   {} {}\n",
            "Total latency:".dimmed(),
            report.total_latency_ms,
            "Query id:".dimmed(),
            report.query_id
        ));

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(report: &ConsensusReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the consensus answer only
    ///
    /// Prints an explicit marker when no agent produced a usable answer.
    pub fn format_answer_only(report: &ConsensusReport) -> String {
        if report.aggregate.has_answer() {
            format!("{}\n", report.answer())
        } else {
            format!(
                "{} {}\n",
                "No consensus:".red().bold(),
                report.aggregate.error().unwrap_or("no valid votes")
            )
        }
    }

    fn format_responses(responses: &[AgentResponse]) -> String {
        let mut output = String::new();
        for response in responses {
            if let Some(error) = &response.error {
                output.push_str(&format!(
                    "  {} {} ({})\n    Error: {}\n",
                    "x".red(),
                    response.agent_id.red().bold(),
                    response.model_id,
                    error
                ));
                continue;
            }

            let answer = if response.answer.is_empty() {
                "(no answer)".dimmed().to_string()
            } else {
                response.answer.clone()
            };
            output.push_str(&format!(
                "  {} {} ({}): {}\n",
                "v".green(),
                response.agent_id.yellow().bold(),
                response.model_id,
                answer
            ));
            output.push_str(&format!(
                "    {}\n",
                format!(
                    "confidence {:.2}  predicted majority {}  {:.0} ms  {} tokens",
                    response.clamped_confidence(),
                    response.predicted_majority.as_deref().unwrap_or("-"),
                    response.latency_ms,
                    response.token_count
                )
                .dimmed()
            ));
        }
        output
    }

    fn format_aggregate(result: &AggregationResult) -> String {
        let mut output = String::new();

        if !result.has_answer() {
            output.push_str(&format!(
                "\n{} {}\n",
                "No consensus:".red().bold(),
                result.error().unwrap_or("no valid votes")
            ));
            return output;
        }

        output.push_str(&format!(
            "\n{} {}\n",
            "Answer:".green().bold(),
            result.answer.bold()
        ));
        output.push_str(&format!(
            "{} {:.2}\n",
            "Agreement:".cyan(),
            result.agreement_rate
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Supported by:".cyan(),
            result.winning_agents.join(", ")
        ));

        let mut scores: Vec<(&String, &f64)> = result.scores.iter().collect();
        scores.sort_by(|a, b| b.1.total_cmp(a.1));
        output.push_str(&format!("{}\n", "Scores:".cyan()));
        for (answer, score) in scores {
            output.push_str(&format!("  {:<24} {:.4}\n", answer, score));
        }

        output
    }

    /// Format a weight table, one agent per line
    pub fn format_weights(weights: &BTreeMap<String, f64>) -> String {
        if weights.is_empty() {
            return format!("  {}\n", "(no weights recorded)".dimmed());
        }
        weights
            .iter()
            .map(|(agent, weight)| format!("  {:<20} {:.4}\n", agent, weight))
            .collect()
    }

    /// Format the configured agents with their current weights
    pub fn format_agents(agents: &[AgentDescriptor], weights: &BTreeMap<String, f64>) -> String {
        let mut output = Self::section_header("Agents");
        if agents.is_empty() {
            output.push_str(&format!("  {}\n", "(no agents configured)".dimmed()));
            return output;
        }

        for agent in agents {
            let status = if agent.enabled {
                "enabled".green()
            } else {
                "disabled".dimmed()
            };
            let weight = weights
                .get(&agent.id)
                .map(|w| format!("{:.4}", w))
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "  {:<16} {:<20} {:<28} weight {:<8} [{}] {}\n",
                agent.id.bold(),
                agent.model,
                agent.endpoint(),
                weight,
                agent.topic_tags.join(", "),
                status
            ));
        }
        output
    }

    /// Format a backend health report
    pub fn format_health(report: &HealthReport) -> String {
        let status = if report.is_ok() {
            report.status.green().bold()
        } else {
            report.status.red().bold()
        };
        let mut output = format!(
            "{} {} ({} agents, {})\n",
            "Status:".cyan().bold(),
            status,
            report.agent_count,
            report.timestamp
        );

        for agent in &report.agents {
            if agent.healthy {
                output.push_str(&format!(
                    "  {} {:<16} {} @ {}\n",
                    "v".green(),
                    agent.agent_id,
                    agent.model,
                    agent.endpoint
                ));
            } else {
                output.push_str(&format!(
                    "  {} {:<16} {} @ {}: {}\n",
                    "x".red(),
                    agent.agent_id,
                    agent.model,
                    agent.endpoint,
                    agent.error.as_deref().unwrap_or("unreachable")
                ));
            }
        }
        output
    }

    /// Format configuration sources as (label, path, exists) rows
    pub fn format_config_sources(sources: &[(String, PathBuf, bool)]) -> String {
        let mut output = Self::section_header("Configuration Sources");
        for (label, path, exists) in sources {
            let marker = if *exists { "v".green() } else { "-".dimmed() };
            output.push_str(&format!(
                "  {} {:<10} {}\n",
                marker,
                label,
                path.display()
            ));
        }
        output
    }

    /// Format configuration validation issues
    pub fn format_issues(issues: &[ConfigIssue]) -> String {
        issues
            .iter()
            .map(|issue| match issue.severity {
                Severity::Error => format!("{} {}\n", "error:".red().bold(), issue.message),
                Severity::Warning => {
                    format!("{} {}\n", "warning:".yellow().bold(), issue.message)
                }
            })
            .collect()
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, report: &ConsensusReport) -> String {
        Self::format(report)
    }

    fn format_json(&self, report: &ConsensusReport) -> String {
        Self::format_json(report)
    }

    fn format_answer_only(&self, report: &ConsensusReport) -> String {
        Self::format_answer_only(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_application::{AgentHealth, QueryError};
    use consensus_domain::{OutputFormat, Strategy, majority_vote};
    use serde_json::Map;

    fn report(responses: Vec<AgentResponse>) -> ConsensusReport {
        let aggregate = majority_vote(&responses);
        ConsensusReport {
            query_id: "q-1".to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            prompt: "What is the capital of France?".to_string(),
            strategy: Strategy::Majority,
            topic: "geography".to_string(),
            aggregate,
            aggregates: None,
            agent_responses: responses,
            weights: BTreeMap::from([("a1".to_string(), 1.2), ("a2".to_string(), 0.8)]),
            total_latency_ms: 12.0,
            debate: None,
            mock: true,
            metadata: Map::new(),
        }
    }

    #[test]
    fn test_full_format_lists_agents_and_answer() {
        let report = report(vec![
            AgentResponse::answered("a1", "llama", "paris"),
            AgentResponse::failure("a2", "qwen", "connection refused"),
        ]);
        let text = ConsoleFormatter::format(&report);

        assert!(text.contains("What is the capital of France?"));
        assert!(text.contains("paris"));
        assert!(text.contains("connection refused"));
        assert!(text.contains("1.2000"));
    }

    #[test]
    fn test_answer_only() {
        let report = report(vec![AgentResponse::answered("a1", "llama", "paris")]);
        assert_eq!(ConsoleFormatter::format_answer_only(&report), "paris\n");
    }

    #[test]
    fn test_answer_only_without_votes() {
        let report = report(vec![AgentResponse::failure("a1", "llama", "timeout")]);
        let text = ConsoleFormatter::format_answer_only(&report);
        assert!(text.contains("No consensus"));
    }

    #[test]
    fn test_render_json_is_parseable() {
        let report = report(vec![AgentResponse::answered("a1", "llama", "paris")]);
        let json = ConsoleFormatter.render(&report, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["aggregate"]["answer"], "paris");
        assert_eq!(value["strategy"], "majority");
    }

    #[test]
    fn test_format_health() {
        let agent = AgentDescriptor::new("a1", "llama");
        let health = HealthReport {
            status: "degraded",
            agent_count: 1,
            agents: vec![AgentHealth::unhealthy(
                &agent,
                &QueryError::ConnectionError("connection refused".to_string()),
            )],
            timestamp: "now".to_string(),
        };
        let text = ConsoleFormatter::format_health(&health);
        assert!(text.contains("degraded"));
        assert!(text.contains("connection refused"));
    }

    #[test]
    fn test_format_agents_marks_missing_weight() {
        let agents = vec![AgentDescriptor::new("a1", "llama").disabled()];
        let text = ConsoleFormatter::format_agents(&agents, &BTreeMap::new());
        assert!(text.contains("llama"));
        assert!(text.contains("disabled"));
    }
}
