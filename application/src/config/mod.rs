//! Application-level configuration.
//!
//! - [`ConsensusConfig`] - learning rule and query timeouts used by the use cases

pub mod consensus_config;

pub use consensus_config::ConsensusConfig;
