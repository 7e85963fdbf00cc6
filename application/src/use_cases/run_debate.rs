//! Run Debate use case
//!
//! Two-round, peer-informed querying:
//!
//! ```text
//! ROUND1 ──(unanimous answer)──▶ FINAL = round-1 majority   (early stop)
//!    │
//!    └──(otherwise)──▶ ROUND2 (peers' answers shown, seed + 7) ──▶ FINAL = round-2 majority
//! ```
//!
//! Every round fans out to all agents at once and waits for all of them.

use super::shared::query_agents;
use crate::ports::agent_query::AgentQuery;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use consensus_domain::{
    AgentDescriptor, AgentQueryRequest, AgentResponse, AggregationResult, PromptTemplate,
    QueryStage, SamplingParams, majority_vote,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Seed offset applied to every round-2 query
pub const ROUND2_SEED_OFFSET: u64 = 7;

/// Full record of one debate
#[derive(Debug, Clone, Serialize)]
pub struct DebateTrace {
    pub round1: Vec<AgentResponse>,
    /// Empty when the debate stopped after round 1
    pub round2: Vec<AgentResponse>,
    #[serde(rename = "final")]
    pub final_result: AggregationResult,
    pub early_stop: bool,
}

impl DebateTrace {
    /// The responses the final answer was decided on
    pub fn final_responses(&self) -> &[AgentResponse] {
        if self.round2.is_empty() {
            &self.round1
        } else {
            &self.round2
        }
    }
}

/// Use case for running a debate across a set of agents
pub struct DebateEngine {
    query: Arc<dyn AgentQuery>,
    timeout: Option<Duration>,
}

impl DebateEngine {
    pub fn new(query: Arc<dyn AgentQuery>) -> Self {
        Self {
            query,
            timeout: None,
        }
    }

    /// Timeout handed to the query backend with every request of both rounds
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Execute the debate with default (no-op) progress
    pub async fn run(
        &self,
        question: &str,
        agents: &[AgentDescriptor],
        params: SamplingParams,
    ) -> DebateTrace {
        self.run_with_progress(question, agents, params, &NoProgress)
            .await
    }

    /// Execute the debate with progress callbacks
    pub async fn run_with_progress(
        &self,
        question: &str,
        agents: &[AgentDescriptor],
        params: SamplingParams,
        progress: &dyn ProgressNotifier,
    ) -> DebateTrace {
        info!("Debate round 1 with {} agents", agents.len());
        let round1_prompt = PromptTemplate::debate_round1(question);
        let requests = agents
            .iter()
            .map(|_| {
                AgentQueryRequest::new(round1_prompt.clone(), params, QueryStage::Round1)
                    .with_timeout(self.timeout)
            })
            .collect();
        let round1 = query_agents(
            self.query.as_ref(),
            agents,
            requests,
            QueryStage::Round1,
            progress,
        )
        .await;

        let round1_result = majority_vote(&round1);
        if round1_result.has_answer() && round1_result.agreement_rate >= 1.0 {
            info!("Debate stopped early on '{}'", round1_result.answer);
            progress.on_early_stop(&round1_result.answer);
            return DebateTrace {
                round1,
                round2: Vec::new(),
                final_result: round1_result,
                early_stop: true,
            };
        }

        info!(
            "Debate round 2 (round 1 agreement {:.3})",
            round1_result.agreement_rate
        );
        let summary = PromptTemplate::peer_summary(&round1);
        let round2_params = params.offset_seed(ROUND2_SEED_OFFSET);
        let requests = agents
            .iter()
            .zip(&round1)
            .map(|(_, previous)| {
                AgentQueryRequest::new(
                    PromptTemplate::debate_round2(question, &previous.answer, &summary),
                    round2_params,
                    QueryStage::Round2,
                )
                .with_timeout(self.timeout)
            })
            .collect();
        let round2 = query_agents(
            self.query.as_ref(),
            agents,
            requests,
            QueryStage::Round2,
            progress,
        )
        .await;

        let final_result = majority_vote(&round2);
        DebateTrace {
            round1,
            round2,
            final_result,
            early_stop: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::shared::test_support::ScriptedQuery;

    fn agents(ids: &[&str]) -> Vec<AgentDescriptor> {
        ids.iter().map(|id| AgentDescriptor::new(*id, "m")).collect()
    }

    fn params() -> SamplingParams {
        SamplingParams {
            temperature: 0.0,
            seed: 42,
            max_tokens: 64,
        }
    }

    #[tokio::test]
    async fn test_unanimous_round1_stops_early() {
        let query = Arc::new(
            ScriptedQuery::new()
                .answer("a", "4")
                .answer("b", "4.")
                .answer("c", "**4**"),
        );
        let engine = DebateEngine::new(query.clone());

        let trace = engine.run("What is 2+2?", &agents(&["a", "b", "c"]), params()).await;

        assert!(trace.early_stop);
        assert!(trace.round2.is_empty());
        assert_eq!(trace.final_result.answer, "4");
        assert_eq!(trace.final_responses().len(), 3);
        assert_eq!(query.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_disagreement_runs_second_round() {
        let query = Arc::new(
            ScriptedQuery::new()
                .answer_at("a", QueryStage::Round1, "x")
                .answer_at("b", QueryStage::Round1, "y")
                .answer_at("c", QueryStage::Round1, "y")
                .answer_at("a", QueryStage::Round2, "y")
                .answer_at("b", QueryStage::Round2, "y")
                .answer_at("c", QueryStage::Round2, "y"),
        );
        let engine = DebateEngine::new(query.clone());

        let trace = engine.run("Q?", &agents(&["a", "b", "c"]), params()).await;

        assert!(!trace.early_stop);
        assert_eq!(trace.round2.len(), 3);
        assert_eq!(trace.final_result.answer, "y");
        assert_eq!(trace.final_result.agreement_rate, 1.0);

        let round2_calls: Vec<_> = query
            .calls()
            .into_iter()
            .filter(|(_, r)| r.stage == QueryStage::Round2)
            .collect();
        assert_eq!(round2_calls.len(), 3);
        for (_, request) in &round2_calls {
            assert_eq!(request.params.seed, 49);
            assert!(request.prompt.contains("- a (m): answer=x conf=0.9"));
        }
        let (_, a_request) = round2_calls.iter().find(|(id, _)| id == "a").unwrap();
        assert!(a_request.prompt.contains("Your previous answer: x"));
    }

    #[tokio::test]
    async fn test_timeout_is_passed_to_backend_in_both_rounds() {
        let query = Arc::new(
            ScriptedQuery::new()
                .answer_at("a", QueryStage::Round1, "x")
                .answer_at("b", QueryStage::Round1, "y")
                .answer("a", "y")
                .answer("b", "y"),
        );
        let engine =
            DebateEngine::new(query.clone()).with_timeout(Some(Duration::from_secs(75)));

        let trace = engine.run("Q?", &agents(&["a", "b"]), params()).await;

        assert!(!trace.early_stop);
        let calls = query.calls();
        assert_eq!(calls.len(), 4);
        assert!(
            calls
                .iter()
                .all(|(_, r)| r.timeout == Some(Duration::from_secs(75)))
        );
    }

    #[tokio::test]
    async fn test_failed_agent_never_aborts_a_round() {
        let query = Arc::new(
            ScriptedQuery::new()
                .answer("a", "x")
                .answer("b", "x"),
        );
        let engine = DebateEngine::new(query);

        let trace = engine.run("Q?", &agents(&["a", "b", "down"]), params()).await;

        // Two agreeing answers plus an empty one is still unanimous among votes
        assert!(trace.early_stop);
        assert_eq!(trace.round1.len(), 3);
        assert!(trace.round1[2].error.is_some());
        assert_eq!(trace.final_result.answer, "x");
    }

    #[tokio::test]
    async fn test_all_failures_yield_empty_final() {
        let engine = DebateEngine::new(Arc::new(ScriptedQuery::new()));

        let trace = engine.run("Q?", &agents(&["a", "b"]), params()).await;

        assert!(!trace.early_stop);
        assert_eq!(trace.round2.len(), 2);
        assert!(!trace.final_result.has_answer());
        assert!(trace.final_result.error().is_some());
    }

    #[test]
    fn test_trace_serializes_final_key() {
        let trace = DebateTrace {
            round1: vec![],
            round2: vec![],
            final_result: majority_vote(&[]),
            early_stop: false,
        };
        let value = serde_json::to_value(&trace).unwrap();
        assert!(value.get("final").is_some());
        assert!(value.get("final_result").is_none());
    }
}
