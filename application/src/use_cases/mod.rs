//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod agent_registry;
pub mod record_feedback;
pub mod run_consensus;
pub mod run_debate;
pub(crate) mod shared;
