//! Stateful aggregation
//!
//! The domain voting functions are pure; this module pairs them with the
//! learned weights and their persistence.

pub mod manager;
pub mod weight_store;

pub use manager::AggregationManager;
pub use weight_store::WeightStore;
