//! Agent registry
//!
//! Holds the configured agent panel, keeps the weight store in sync with it
//! and probes the agents' backends.

use crate::aggregation::AggregationManager;
use crate::ports::agent_query::{AgentHealth, AgentQuery};
use crate::ports::weight_repository::WeightStoreError;
use consensus_domain::AgentDescriptor;
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Overall backend status of the enabled agents
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// `"ok"` when every enabled agent is reachable, `"degraded"` otherwise
    pub status: &'static str,
    pub agent_count: usize,
    pub agents: Vec<AgentHealth>,
    pub timestamp: String,
}

impl HealthReport {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

pub struct AgentRegistry {
    agents: RwLock<Vec<AgentDescriptor>>,
    manager: Arc<AggregationManager>,
}

impl AgentRegistry {
    /// Create the registry and give every new agent its base weight
    pub fn new(
        agents: Vec<AgentDescriptor>,
        manager: Arc<AggregationManager>,
    ) -> Result<Self, WeightStoreError> {
        manager.initialize_weights(&agents)?;
        Ok(Self {
            agents: RwLock::new(agents),
            manager,
        })
    }

    pub fn manager(&self) -> &Arc<AggregationManager> {
        &self.manager
    }

    /// Every configured agent, enabled or not
    pub fn agents(&self) -> Vec<AgentDescriptor> {
        self.agents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn enabled_agents(&self) -> Vec<AgentDescriptor> {
        self.agents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|a| a.enabled)
            .cloned()
            .collect()
    }

    pub fn weights(&self) -> BTreeMap<String, f64> {
        self.manager.store().weights()
    }

    /// Replace the panel; learned weights of known agents are kept
    pub fn reload(&self, agents: Vec<AgentDescriptor>) -> Result<usize, WeightStoreError> {
        self.manager.initialize_weights(&agents)?;
        let count = agents.len();
        *self.agents.write().unwrap_or_else(PoisonError::into_inner) = agents;
        info!("Reloaded {} agents", count);
        Ok(count)
    }

    /// Probe every enabled agent concurrently
    pub async fn check_health(&self, query: &dyn AgentQuery) -> HealthReport {
        let agents = self.enabled_agents();
        let probes = agents.iter().map(|agent| async move {
            match query.check_health(agent).await {
                Ok(()) => AgentHealth::healthy(agent),
                Err(e) => AgentHealth::unhealthy(agent, &e),
            }
        });
        let statuses = join_all(probes).await;

        let all_healthy = !statuses.is_empty() && statuses.iter().all(|s| s.healthy);
        HealthReport {
            status: if all_healthy { "ok" } else { "degraded" },
            agent_count: statuses.len(),
            agents: statuses,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
