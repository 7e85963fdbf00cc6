//! Agent query port
//!
//! Defines how the application layer asks a single agent a single question.
//! Transports (HTTP model servers, the offline mock) live in the
//! infrastructure layer.

use async_trait::async_trait;
use consensus_domain::{AgentDescriptor, AgentQueryRequest, AgentResponse};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while querying an agent
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Backend returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Result of probing one agent's backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentHealth {
    pub agent_id: String,
    pub model: String,
    pub endpoint: String,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentHealth {
    pub fn healthy(agent: &AgentDescriptor) -> Self {
        Self {
            agent_id: agent.id.clone(),
            model: agent.model.clone(),
            endpoint: agent.endpoint(),
            healthy: true,
            error: None,
        }
    }

    pub fn unhealthy(agent: &AgentDescriptor, error: &QueryError) -> Self {
        Self {
            healthy: false,
            error: Some(error.to_string()),
            ..Self::healthy(agent)
        }
    }
}

/// Single-agent query operation
///
/// A successful call returns the extracted answer triple. Errors are turned
/// into error-carrying [`AgentResponse`]s by the use cases, so a failing
/// agent never aborts a round.
#[async_trait]
pub trait AgentQuery: Send + Sync {
    /// Send one prompt to one agent
    async fn query(
        &self,
        agent: &AgentDescriptor,
        request: &AgentQueryRequest,
    ) -> Result<AgentResponse, QueryError>;

    /// Check whether the agent's backend is reachable
    async fn check_health(&self, agent: &AgentDescriptor) -> Result<(), QueryError>;
}
