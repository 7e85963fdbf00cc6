//! Port for structured query logging.
//!
//! Defines the [`QueryLogger`] trait for recording one machine-readable
//! record per consensus request (experiment variables, outcome, per-agent
//! responses) and per feedback call.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the data
//! needed to analyse runs afterwards (JSONL).

use serde_json::Value;

/// A structured query event for logging.
pub struct QueryEvent {
    /// Event type identifier (e.g., "consensus", "feedback").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl QueryEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging query events.
///
/// `log` is synchronous and infallible; implementations report their own
/// failures through `tracing` and carry on.
pub trait QueryLogger: Send + Sync {
    fn log(&self, event: QueryEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoQueryLogger;

impl QueryLogger for NoQueryLogger {
    fn log(&self, _event: QueryEvent) {}
}
