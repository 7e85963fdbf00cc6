//! Consensus strategies
//!
//! The closed set of rules for combining agent responses into one answer.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Strategy for combining agent responses
///
/// - `Majority`: most frequent normalized answer
/// - `Weighted`: confidence × learned-weight score
/// - `Isp`: inverse surprising popularity (actual vs predicted support)
/// - `Topic`: weighted vote over a topic-routed agent subset
/// - `Debate`: two-round peer-informed majority (multi-round, see the debate use case)
///
/// # Example
///
/// ```
/// use consensus_domain::Strategy;
///
/// let strategy: Strategy = "ISP".parse().unwrap();
/// assert_eq!(strategy, Strategy::Isp);
/// assert!("borda".parse::<Strategy>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Majority,
    Weighted,
    Isp,
    Topic,
    Debate,
}

impl Strategy {
    /// Strategies that aggregate a single round of responses
    pub const DIRECT: [Strategy; 3] = [Strategy::Majority, Strategy::Weighted, Strategy::Isp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Majority => "majority",
            Strategy::Weighted => "weighted",
            Strategy::Isp => "isp",
            Strategy::Topic => "topic",
            Strategy::Debate => "debate",
        }
    }

    /// Whether this strategy needs more than one query round
    pub fn is_multi_round(&self) -> bool {
        matches!(self, Strategy::Debate)
    }

    /// Whether agent selection is restricted by topic routing
    pub fn uses_topic_routing(&self) -> bool {
        matches!(self, Strategy::Topic)
    }

    pub fn all() -> [Strategy; 5] {
        [
            Strategy::Majority,
            Strategy::Weighted,
            Strategy::Isp,
            Strategy::Topic,
            Strategy::Debate,
        ]
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Strategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "majority" => Ok(Strategy::Majority),
            "weighted" => Ok(Strategy::Weighted),
            "isp" => Ok(Strategy::Isp),
            "topic" => Ok(Strategy::Topic),
            "debate" => Ok(Strategy::Debate),
            other => Err(DomainError::UnknownStrategy(other.to_string())),
        }
    }
}
