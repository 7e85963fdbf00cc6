//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod agent_query;
pub mod progress;
pub mod query_logger;
pub mod weight_repository;
