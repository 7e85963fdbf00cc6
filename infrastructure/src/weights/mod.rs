//! Weight persistence
//!
//! Provides [`JsonWeightRepository`], implementing the
//! [`WeightRepository`](consensus_application::WeightRepository) port.

mod json_repository;

pub use json_repository::JsonWeightRepository;
