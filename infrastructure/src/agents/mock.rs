//! Offline mock agents.
//!
//! Every reply is a pure function of (seed, agent, stage, prompt), so runs
//! are reproducible without any model server. Known questions get fixed
//! answers; option-letter prompts get a stable letter per agent; anything
//! else gets a stable pick from a small pool.

use super::extract::approx_token_count;
use async_trait::async_trait;
use consensus_application::ports::agent_query::{AgentQuery, QueryError};
use consensus_domain::{AgentDescriptor, AgentQueryRequest, AgentResponse};
use serde_json::json;

const OPTION_ANSWERS: [&str; 4] = ["a", "b", "c", "d"];
const FREE_ANSWERS: [&str; 5] = ["true", "false", "42", "paris", "b"];
const PREDICTION_POOL: [&str; 8] = ["true", "false", "42", "paris", "b", "a", "c", "d"];

/// Probability that an agent predicts the group will agree with it
const SELF_PREDICTION_RATE: f64 = 0.75;

/// First 8 bytes of the BLAKE3 digest of `key`
fn stable_u64(key: &str) -> u64 {
    let digest = blake3::hash(key.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

fn stable_choice<'a>(options: &[&'a str], key: &str) -> &'a str {
    if options.is_empty() {
        return "";
    }
    options[(stable_u64(key) % options.len() as u64) as usize]
}

/// Uniform draw in [0, 1)
fn stable_unit(key: &str) -> f64 {
    (stable_u64(key) >> 11) as f64 / (1u64 << 53) as f64
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Deterministic offline [`AgentQuery`]
#[derive(Debug, Default, Clone, Copy)]
pub struct MockAgentQuery;

impl MockAgentQuery {
    pub fn new() -> Self {
        Self
    }

    fn respond(agent: &AgentDescriptor, request: &AgentQueryRequest) -> AgentResponse {
        let seed = request.params.seed;
        let stage = request.stage.as_str();
        let prompt = request.prompt.as_str();
        let lowered = prompt.to_lowercase();
        let draw = |n: u32| stable_unit(&format!("{seed}-{}-{stage}-{prompt}#{n}", agent.id));

        let answer = if lowered.contains("2+2") || lowered.contains("2 + 2") {
            "4"
        } else if lowered.contains("capital of france") {
            "paris"
        } else if ["a.", "b.", "c.", "d."].iter().any(|k| lowered.contains(k)) {
            stable_choice(&OPTION_ANSWERS, &format!("{seed}-{}-{prompt}", agent.id))
        } else {
            stable_choice(
                &FREE_ANSWERS,
                &format!("{seed}-{}-{prompt}-{stage}", agent.id),
            )
        };

        let predicted_majority = if draw(0) < SELF_PREDICTION_RATE {
            answer
        } else {
            stable_choice(
                &PREDICTION_POOL,
                &format!("{seed}-{}-pred-{prompt}", agent.id),
            )
        };
        let confidence = round3(0.45 + draw(1) * 0.5);
        let latency_ms = round3(60.0 + draw(2) * 220.0);

        let raw = json!({
            "answer": answer,
            "confidence": confidence,
            "predicted_majority": predicted_majority,
        })
        .to_string();
        let token_count = approx_token_count(&raw);

        AgentResponse::answered(&agent.id, &agent.model, answer)
            .with_raw_text(raw)
            .with_predicted_majority(predicted_majority)
            .with_confidence(confidence)
            .with_latency_ms(latency_ms)
            .with_token_count(token_count)
    }
}

#[async_trait]
impl AgentQuery for MockAgentQuery {
    async fn query(
        &self,
        agent: &AgentDescriptor,
        request: &AgentQueryRequest,
    ) -> Result<AgentResponse, QueryError> {
        Ok(Self::respond(agent, request))
    }

    async fn check_health(&self, _agent: &AgentDescriptor) -> Result<(), QueryError> {
        Ok(())
    }
}
