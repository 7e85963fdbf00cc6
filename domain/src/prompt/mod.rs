//! Prompt domain
//!
//! Templates for the direct query and both debate rounds.

mod template;

pub use template::PromptTemplate;
