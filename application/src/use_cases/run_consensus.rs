//! Run Consensus use case
//!
//! Orchestrates one consensus request: agent selection (optionally by
//! topic), querying (direct fan-out or debate), aggregation, optional
//! ground-truth learning and the structured query log record.

use super::agent_registry::AgentRegistry;
use super::run_debate::{DebateEngine, DebateTrace};
use super::shared::query_agents;
use crate::aggregation::AggregationManager;
use crate::config::ConsensusConfig;
use crate::ports::agent_query::AgentQuery;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::query_logger::{NoQueryLogger, QueryEvent, QueryLogger};
use crate::ports::weight_repository::WeightStoreError;
use consensus_domain::{
    AgentDescriptor, AgentQueryRequest, AgentResponse, AggregationResult, DomainError,
    GENERAL_TOPIC, QueryStage, Question, SamplingParams, Strategy, TopicRouter,
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Errors that can occur during a consensus request
#[derive(Error, Debug)]
pub enum RunConsensusError {
    #[error("No enabled agents available")]
    NoAgents,

    #[error("Mock agents were requested but no mock backend is configured")]
    MockUnavailable,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Weight update failed: {0}")]
    Weights(#[from] WeightStoreError),
}

/// Input for the RunConsensus use case
#[derive(Debug, Clone)]
pub struct RunConsensusInput {
    pub prompt: String,
    pub strategy: Strategy,
    pub temperature: f64,
    /// Forces temperature to 0.0
    pub deterministic: bool,
    pub seed: u64,
    pub max_tokens: u32,
    pub max_agents: Option<usize>,
    /// When present, agent weights are updated from it after aggregation
    pub ground_truth: Option<String>,
    /// Use the offline mock agents instead of the configured transport
    pub mock: bool,
    /// Compute every direct strategy and return the requested one
    pub compute_all: bool,
    /// Caller-supplied labels echoed into the report
    pub metadata: Map<String, Value>,
}

impl RunConsensusInput {
    pub fn new(prompt: impl Into<String>) -> Self {
        let defaults = SamplingParams::default();
        Self {
            prompt: prompt.into(),
            strategy: Strategy::default(),
            temperature: defaults.temperature,
            deterministic: true,
            seed: defaults.seed,
            max_tokens: defaults.max_tokens,
            max_agents: None,
            ground_truth: None,
            mock: false,
            compute_all: false,
            metadata: Map::new(),
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self.deterministic = false;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_max_agents(mut self, max_agents: Option<usize>) -> Self {
        self.max_agents = max_agents;
        self
    }

    pub fn with_ground_truth(mut self, truth: impl Into<String>) -> Self {
        self.ground_truth = Some(truth.into());
        self
    }

    pub fn with_mock(mut self, mock: bool) -> Self {
        self.mock = mock;
        self
    }

    pub fn with_compute_all(mut self, compute_all: bool) -> Self {
        self.compute_all = compute_all;
        self
    }

    /// Sampling parameters sent to every agent
    pub fn sampling_params(&self) -> SamplingParams {
        SamplingParams {
            temperature: if self.deterministic {
                0.0
            } else {
                self.temperature
            },
            seed: self.seed,
            max_tokens: self.max_tokens,
        }
    }
}

/// Everything known about one finished consensus request
#[derive(Debug, Clone, Serialize)]
pub struct ConsensusReport {
    pub query_id: String,
    pub timestamp: String,
    pub prompt: String,
    pub strategy: Strategy,
    pub topic: String,
    pub aggregate: AggregationResult,
    /// Present when every direct strategy was computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregates: Option<BTreeMap<String, AggregationResult>>,
    pub agent_responses: Vec<AgentResponse>,
    pub weights: BTreeMap<String, f64>,
    pub total_latency_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debate: Option<DebateTrace>,
    pub mock: bool,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl ConsensusReport {
    pub fn answer(&self) -> &str {
        &self.aggregate.answer
    }
}

/// Use case for answering one prompt with the agent panel
pub struct RunConsensusUseCase {
    query: Arc<dyn AgentQuery>,
    mock_query: Option<Arc<dyn AgentQuery>>,
    registry: Arc<AgentRegistry>,
    router: TopicRouter,
    config: ConsensusConfig,
    logger: Arc<dyn QueryLogger>,
}

impl RunConsensusUseCase {
    pub fn new(query: Arc<dyn AgentQuery>, registry: Arc<AgentRegistry>) -> Self {
        Self {
            query,
            mock_query: None,
            registry,
            router: TopicRouter::default(),
            config: ConsensusConfig::default(),
            logger: Arc::new(NoQueryLogger),
        }
    }

    /// Transport used for requests with `mock` set
    pub fn with_mock_query(mut self, mock_query: Arc<dyn AgentQuery>) -> Self {
        self.mock_query = Some(mock_query);
        self
    }

    pub fn with_router(mut self, router: TopicRouter) -> Self {
        self.router = router;
        self
    }

    pub fn with_config(mut self, config: ConsensusConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn QueryLogger>) -> Self {
        self.logger = logger;
        self
    }

    fn manager(&self) -> &AggregationManager {
        self.registry.manager()
    }

    fn query_for(
        &self,
        input: &RunConsensusInput,
    ) -> Result<Arc<dyn AgentQuery>, RunConsensusError> {
        if !input.mock {
            return Ok(Arc::clone(&self.query));
        }
        self.mock_query
            .as_ref()
            .map(Arc::clone)
            .ok_or(RunConsensusError::MockUnavailable)
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunConsensusInput,
    ) -> Result<ConsensusReport, RunConsensusError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunConsensusInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<ConsensusReport, RunConsensusError> {
        Question::new(input.prompt.as_str())?;
        let started = Instant::now();
        let params = input.sampling_params();
        let enabled = self.registry.enabled_agents();

        let mut topic = GENERAL_TOPIC.to_string();
        let selected = if input.strategy.uses_topic_routing() && !input.compute_all {
            let route = self.router.route(&input.prompt, &enabled, input.max_agents);
            topic = route.topic;
            route.agents
        } else {
            truncate_agents(enabled, input.max_agents)
        };

        if selected.is_empty() {
            return Err(RunConsensusError::NoAgents);
        }
        info!(
            "Consensus '{}' with {} agents (topic {})",
            input.strategy,
            selected.len(),
            topic
        );

        let query = self.query_for(&input)?;
        let mut aggregates = None;
        let mut debate = None;

        let (aggregate, agent_responses) = if input.strategy.is_multi_round() {
            let trace = DebateEngine::new(query)
                .with_timeout(self.config.debate_timeout)
                .run_with_progress(&input.prompt, &selected, params, progress)
                .await;
            let responses = trace.final_responses().to_vec();
            let result = trace.final_result.clone();
            debate = Some(trace);
            (result, responses)
        } else {
            let requests = selected
                .iter()
                .map(|_| {
                    AgentQueryRequest::new(input.prompt.clone(), params, QueryStage::Direct)
                        .with_timeout(self.config.query_timeout)
                })
                .collect();
            let responses = query_agents(
                query.as_ref(),
                &selected,
                requests,
                QueryStage::Direct,
                progress,
            )
            .await;

            if input.compute_all {
                let (routed_topic, all) = self.aggregate_all(&input.prompt, &selected, &responses);
                topic = routed_topic;
                let result = all
                    .get(input.strategy.as_str())
                    .or_else(|| all.get(Strategy::Majority.as_str()))
                    .cloned()
                    .unwrap_or_else(|| self.manager().majority_vote(&responses));
                aggregates = Some(all);
                (result, responses)
            } else {
                let result = self
                    .manager()
                    .aggregate(input.strategy, &responses, Some(topic.as_str()))?;
                (result, responses)
            }
        };

        if let Some(truth) = input.ground_truth.as_deref() {
            self.manager()
                .update_weights_from_ground_truth(&agent_responses, truth)?;
        }

        let report = ConsensusReport {
            query_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            prompt: input.prompt.clone(),
            strategy: input.strategy,
            topic,
            aggregate,
            aggregates,
            agent_responses,
            weights: self.registry.weights(),
            total_latency_ms: started.elapsed().as_secs_f64() * 1000.0,
            debate,
            mock: input.mock,
            metadata: input.metadata.clone(),
        };

        info!(
            "Consensus answer '{}' (agreement {:.3})",
            report.aggregate.answer, report.aggregate.agreement_rate
        );
        self.logger.log(log_event(&input, &report));
        Ok(report)
    }

    /// Every direct strategy on the same responses.
    ///
    /// The topic vote only counts agents the router would pick for this
    /// prompt, falling back to all responses when none of them answered.
    fn aggregate_all(
        &self,
        prompt: &str,
        selected: &[AgentDescriptor],
        responses: &[AgentResponse],
    ) -> (String, BTreeMap<String, AggregationResult>) {
        let manager = self.manager();
        let mut all = BTreeMap::new();
        all.insert(
            Strategy::Majority.as_str().to_string(),
            manager.majority_vote(responses),
        );
        all.insert(
            Strategy::Weighted.as_str().to_string(),
            manager.weighted_vote(responses),
        );
        all.insert(
            Strategy::Isp.as_str().to_string(),
            manager.inverse_surprising_popularity(responses),
        );

        let route = self.router.route(prompt, selected, None);
        let ids = route.agent_ids();
        let mut topic_responses: Vec<AgentResponse> = responses
            .iter()
            .filter(|r| ids.contains(&r.agent_id.as_str()))
            .cloned()
            .collect();
        if topic_responses.is_empty() {
            topic_responses = responses.to_vec();
        }
        debug!(
            "Topic '{}' vote over {} of {} responses",
            route.topic,
            topic_responses.len(),
            responses.len()
        );
        all.insert(
            Strategy::Topic.as_str().to_string(),
            manager.topic_weighted_vote(&topic_responses, &route.topic),
        );

        (route.topic, all)
    }
}

fn truncate_agents(mut agents: Vec<AgentDescriptor>, max_agents: Option<usize>) -> Vec<AgentDescriptor> {
    if let Some(limit) = max_agents
        && limit > 0
    {
        agents.truncate(limit);
    }
    agents
}

fn log_event(input: &RunConsensusInput, report: &ConsensusReport) -> QueryEvent {
    let params = input.sampling_params();
    QueryEvent::new(
        "consensus",
        json!({
            "query_id": report.query_id,
            "independent_variables": {
                "strategy": input.strategy,
                "temperature": params.temperature,
                "deterministic": input.deterministic,
                "seed": params.seed,
                "max_agents": input.max_agents,
                "mock": input.mock,
            },
            "dependent_variables": {
                "aggregate_answer": report.aggregate.answer,
                "agreement_rate": report.aggregate.agreement_rate,
                "total_latency_ms": report.total_latency_ms,
            },
            "ground_truth": input.ground_truth,
            "agent_responses": report.agent_responses,
        }),
    )
}
