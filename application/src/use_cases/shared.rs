//! Shared utilities for use cases.
//!
//! Contains the concurrent fan-out used by both the direct query path and
//! every debate round.

use crate::ports::agent_query::AgentQuery;
use crate::ports::progress::ProgressNotifier;
use consensus_domain::{AgentDescriptor, AgentQueryRequest, AgentResponse, QueryStage};
use futures::future::join_all;
use std::time::Instant;
use tracing::{debug, warn};

/// Query every agent concurrently and wait for all of them.
///
/// `requests[i]` is sent to `agents[i]`, and the returned responses keep
/// that order. A failed query (including one the backend timed out)
/// becomes an error-carrying response with an empty answer; it never
/// aborts the round.
pub(crate) async fn query_agents(
    query: &dyn AgentQuery,
    agents: &[AgentDescriptor],
    requests: Vec<AgentQueryRequest>,
    stage: QueryStage,
    progress: &dyn ProgressNotifier,
) -> Vec<AgentResponse> {
    debug_assert_eq!(agents.len(), requests.len());
    progress.on_round_start(stage, agents.len());

    let futures = agents.iter().zip(requests).map(|(agent, request)| async move {
        let started = Instant::now();
        let outcome = query.query(agent, &request).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let response = match outcome {
            Ok(response) => {
                debug!("Agent {} answered '{}' ({})", agent.id, response.answer, stage);
                response
            }
            Err(e) => {
                warn!("Agent {} failed ({}): {}", agent.id, stage, e);
                AgentResponse::failure(&agent.id, &agent.model, e.to_string())
                    .with_latency_ms(elapsed_ms)
            }
        };
        progress.on_agent_complete(stage, &agent.id, response.is_success());
        response
    });

    let responses = join_all(futures).await;
    progress.on_round_complete(stage);
    responses
}


#[cfg(test)]
mod tests {
    use super::test_support::ScriptedQuery;
    use super::*;
    use crate::ports::progress::NoProgress;
    use consensus_domain::SamplingParams;

    fn agents(ids: &[&str]) -> Vec<AgentDescriptor> {
        ids.iter().map(|id| AgentDescriptor::new(*id, "m")).collect()
    }

    fn requests(n: usize) -> Vec<AgentQueryRequest> {
        (0..n)
            .map(|_| AgentQueryRequest::new("q", SamplingParams::default(), QueryStage::Direct))
            .collect()
    }

    #[tokio::test]
    async fn test_responses_keep_agent_order() {
        let query = ScriptedQuery::new()
            .answer("a", "1")
            .answer("b", "2")
            .answer("c", "3");
        let agents = agents(&["a", "b", "c"]);

        let responses = query_agents(
            &query,
            &agents,
            requests(3),
            QueryStage::Direct,
            &NoProgress,
        )
        .await;

        let ids: Vec<_> = responses.iter().map(|r| r.agent_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        let answers: Vec<_> = responses.iter().map(|r| r.answer.as_str()).collect();
        assert_eq!(answers, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_failure_becomes_error_response() {
        let query = ScriptedQuery::new().answer("a", "1");
        let agents = agents(&["a", "down"]);

        let responses = query_agents(
            &query,
            &agents,
            requests(2),
            QueryStage::Direct,
            &NoProgress,
        )
        .await;

        assert_eq!(responses.len(), 2);
        assert!(responses[0].is_success());
        assert_eq!(responses[1].agent_id, "down");
        assert_eq!(responses[1].answer, "");
        assert!(responses[1].error.as_deref().unwrap().contains("connection refused"));
    }
}
