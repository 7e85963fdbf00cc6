//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Unsupported strategy: {0}. Valid: majority, weighted, isp, topic, debate")]
    UnknownStrategy(String),

    #[error("Strategy '{0}' is not a single-round aggregation; run it through the debate engine")]
    UnsupportedAggregation(String),

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),
}

impl DomainError {
    /// Check if this error is a caller usage error (as opposed to missing data)
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            DomainError::UnknownStrategy(_) | DomainError::UnsupportedAggregation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_strategy_display() {
        let error = DomainError::UnknownStrategy("borda".to_string());
        assert!(error.to_string().starts_with("Unsupported strategy: borda"));
    }

    #[test]
    fn test_is_usage_error() {
        assert!(DomainError::UnknownStrategy("x".to_string()).is_usage_error());
        assert!(DomainError::UnsupportedAggregation("debate".to_string()).is_usage_error());
        assert!(!DomainError::InvalidQuestion("empty".to_string()).is_usage_error());
    }
}
