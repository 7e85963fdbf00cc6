//! Logging infrastructure - structured query metrics.
//!
//! Provides [`JsonlQueryLogger`], a JSONL file writer that implements the
//! [`QueryLogger`](consensus_application::QueryLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlQueryLogger;
