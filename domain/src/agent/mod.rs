//! Agent domain
//!
//! Static agent descriptors, the per-round response value object, query
//! request parameters and configuration validation for the agent panel.

pub mod descriptor;
pub mod query;
pub mod response;
pub mod validation;

pub use descriptor::{AgentDescriptor, GENERAL_TAG};
pub use query::{AgentQueryRequest, QueryStage, SamplingParams};
pub use response::{AgentResponse, DEFAULT_CONFIDENCE};
