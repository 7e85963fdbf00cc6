//! Output format value object

use serde::{Deserialize, Serialize};

/// Output format for consensus results
///
/// Shared by the config file (`[output] format`) and the CLI `--output` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aggregate, per-agent responses, weights and debate rounds
    Full,
    /// Only the consensus answer and its agreement (default)
    #[default]
    Answer,
    /// The whole report as JSON
    Json,
}
