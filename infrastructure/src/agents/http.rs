//! HTTP agent backend.
//!
//! Talks to Ollama-compatible model servers: `POST /api/generate` for
//! answers and `GET /api/tags` as a health probe.

use super::extract::parse_completion;
use async_trait::async_trait;
use consensus_application::ports::agent_query::{AgentQuery, QueryError};
use consensus_domain::{AgentDescriptor, AgentQueryRequest, AgentResponse, PromptTemplate};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Sequences that end generation early; answers are expected on one line
const STOP_SEQUENCES: [&str; 3] = ["\n\n", "\nExplanation:", "Explanation:"];

/// Timeout of the `/api/tags` probe
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Host name marking an agent that is always reported healthy
const MOCK_HOST: &str = "mock";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f64,
    seed: u64,
    num_predict: u32,
    stop: [&'static str; 3],
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    response: String,
    #[serde(default)]
    eval_count: Option<u64>,
}

fn map_reqwest_error(e: reqwest::Error) -> QueryError {
    if e.is_timeout() {
        QueryError::Timeout
    } else if e.is_connect() {
        QueryError::ConnectionError(e.to_string())
    } else if let Some(status) = e.status() {
        QueryError::HttpStatus {
            status: status.as_u16(),
            message: e.to_string(),
        }
    } else if e.is_decode() {
        QueryError::InvalidResponse(e.to_string())
    } else {
        QueryError::Other(e.to_string())
    }
}

/// Agent query adapter for Ollama-style HTTP backends
pub struct HttpAgentQuery {
    client: reqwest::Client,
}

impl HttpAgentQuery {
    /// Create an adapter whose requests time out after `timeout`
    ///
    /// A request carrying its own timeout overrides this default.
    pub fn new(timeout: Duration) -> Result<Self, QueryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QueryError::Other(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    fn generate_request<'a>(
        agent: &'a AgentDescriptor,
        request: &AgentQueryRequest,
    ) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &agent.model,
            prompt: PromptTemplate::ensemble_wrapper(&request.prompt),
            stream: false,
            options: GenerateOptions {
                temperature: request.params.temperature,
                seed: request.params.seed,
                num_predict: request.params.max_tokens,
                stop: STOP_SEQUENCES,
            },
        }
    }
}

#[async_trait]
impl AgentQuery for HttpAgentQuery {
    async fn query(
        &self,
        agent: &AgentDescriptor,
        request: &AgentQueryRequest,
    ) -> Result<AgentResponse, QueryError> {
        let url = format!("{}/api/generate", agent.endpoint());
        let started = Instant::now();

        let mut builder = self
            .client
            .post(&url)
            .json(&Self::generate_request(agent, request));
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let body: GenerateResponse = builder
            .send()
            .await
            .map_err(map_reqwest_error)?
            .error_for_status()
            .map_err(map_reqwest_error)?
            .json()
            .await
            .map_err(map_reqwest_error)?;

        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        let parsed = parse_completion(&body.response, body.eval_count);
        debug!(
            "Agent {} raw reply {:?} -> '{}'",
            agent.id, body.response, parsed.answer
        );

        let model_id = body
            .model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| agent.model.clone());
        Ok(AgentResponse::answered(&agent.id, model_id, parsed.answer)
            .with_raw_text(body.response)
            .with_predicted_majority(parsed.predicted_majority)
            .with_confidence(parsed.confidence)
            .with_latency_ms(latency_ms)
            .with_token_count(parsed.token_count))
    }

    async fn check_health(&self, agent: &AgentDescriptor) -> Result<(), QueryError> {
        if agent.host == MOCK_HOST {
            return Ok(());
        }
        self.client
            .get(format!("{}/api/tags", agent.endpoint()))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map_err(map_reqwest_error)?
            .error_for_status()
            .map_err(map_reqwest_error)?;
        Ok(())
    }
}
