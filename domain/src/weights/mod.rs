//! Learned agent reliability
//!
//! Pure in-memory model of agent weights: the EMA learning rule, weight
//! bounds and the bounded correctness history. Persistence and locking live
//! in the application layer's `WeightStore`.

pub mod record;

pub use record::{HISTORY_CAPACITY, LearningRule, WeightBounds, WeightRecord, WeightTable};
