//! Infrastructure layer for agent-consensus
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: agent backends, weight persistence, the
//! query metrics log and configuration file loading.

pub mod agents;
pub mod config;
pub mod logging;
pub mod weights;

// Re-export commonly used types
#[cfg(feature = "http")]
pub use agents::HttpAgentQuery;
pub use agents::MockAgentQuery;
pub use config::{
    ConfigError, ConfigLoader, FileAgentEntry, FileConfig, FileGlobalConfig, FileOutputConfig,
};
pub use logging::JsonlQueryLogger;
pub use weights::JsonWeightRepository;
