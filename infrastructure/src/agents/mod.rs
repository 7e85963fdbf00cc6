//! Agent query adapters
//!
//! Implementations of the [`AgentQuery`](consensus_application::AgentQuery)
//! port, plus the helpers that turn raw model output into answers.
//!
//! | Adapter | Backend | Feature |
//! |---------|---------|---------|
//! | [`HttpAgentQuery`] | Ollama-compatible `/api/generate` | `http` |
//! | [`MockAgentQuery`] | Deterministic offline replies | always |

pub mod extract;
#[cfg(feature = "http")]
mod http;
mod mock;

#[cfg(feature = "http")]
pub use http::HttpAgentQuery;
pub use mock::MockAgentQuery;
