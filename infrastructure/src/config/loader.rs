//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use consensus_domain::agent::validation::{ConfigIssue, Severity};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Project-level config file names, checked in order
const PROJECT_CONFIG_FILES: [&str; 2] = ["consensus.toml", ".consensus.toml"];

/// Prefix of environment overrides (`CONSENSUS_GLOBAL__WEIGHTS_PATH=...`)
const ENV_PREFIX: &str = "CONSENSUS_";

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration:\n{}", format_issues(.0))]
    Invalid(Vec<ConfigIssue>),
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("  - {}", i.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `CONSENSUS_*` environment variables (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./consensus.toml` or `./.consensus.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/agent-consensus/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(project_path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&project_path));
        }

        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract().map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Load a single file on top of the defaults, ignoring every other source
    pub fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Figment::new()
            .merge(Serialized::defaults(FileConfig::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Fail on error-level issues; return the warnings for the caller to report
    pub fn check(config: &FileConfig) -> Result<Vec<ConfigIssue>, ConfigError> {
        let (errors, warnings): (Vec<_>, Vec<_>) = config
            .validate()
            .into_iter()
            .partition(|i| i.severity == Severity::Error);
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/agent-consensus/config.toml if set,
    /// otherwise falls back to ~/.config/agent-consensus/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("agent-consensus").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations being used (for `config` output)
    pub fn config_sources(explicit: Option<&Path>) -> Vec<(String, PathBuf, bool)> {
        let mut sources = Vec::new();
        if let Some(path) = explicit {
            sources.push(("Explicit".to_string(), path.to_path_buf(), path.exists()));
        }
        match Self::project_config_path() {
            Some(path) => sources.push(("Project".to_string(), path, true)),
            None => sources.push((
                "Project".to_string(),
                PathBuf::from(PROJECT_CONFIG_FILES[0]),
                false,
            )),
        }
        if let Some(path) = Self::global_config_path() {
            let exists = path.exists();
            sources.push(("Global".to_string(), path, exists));
        }
        sources
    }
}
