//! Configuration file loading for agent-consensus
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CONSENSUS_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./consensus.toml` or `./.consensus.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/agent-consensus/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{FileAgentEntry, FileConfig, FileGlobalConfig, FileOutputConfig};
pub use loader::{ConfigError, ConfigLoader};
