//! Application layer for agent-consensus
//!
//! This crate contains use cases, port definitions, the stateful aggregation
//! manager and application configuration. It depends only on the domain
//! layer.

pub mod aggregation;
pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use aggregation::{AggregationManager, WeightStore};
pub use config::ConsensusConfig;
pub use ports::{
    agent_query::{AgentHealth, AgentQuery, QueryError},
    progress::{NoProgress, ProgressNotifier},
    query_logger::{NoQueryLogger, QueryEvent, QueryLogger},
    weight_repository::{InMemoryWeightRepository, WeightRepository, WeightStoreError},
};
pub use use_cases::agent_registry::{AgentRegistry, HealthReport};
pub use use_cases::record_feedback::{RecordFeedbackInput, RecordFeedbackUseCase};
pub use use_cases::run_consensus::{
    ConsensusReport, RunConsensusError, RunConsensusInput, RunConsensusUseCase,
};
pub use use_cases::run_debate::{DebateEngine, DebateTrace, ROUND2_SEED_OFFSET};
