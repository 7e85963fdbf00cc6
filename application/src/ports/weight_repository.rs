//! Weight repository port
//!
//! Durable storage for the agent id → weight map. The store reads the map
//! once at startup and rewrites it in full on every change.

use std::collections::BTreeMap;
use std::sync::Mutex;
use thiserror::Error;

/// Errors that can occur while persisting weights
#[derive(Error, Debug)]
pub enum WeightStoreError {
    #[error("Failed to write weights to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize weights: {0}")]
    Serialization(String),
}

/// Storage backend for learned agent weights
pub trait WeightRepository: Send + Sync {
    /// Read the stored map.
    ///
    /// Missing or unreadable storage yields an empty map; implementations log
    /// the problem instead of failing.
    fn load(&self) -> BTreeMap<String, f64>;

    /// Replace the stored map
    fn save(&self, weights: &BTreeMap<String, f64>) -> Result<(), WeightStoreError>;
}

/// Volatile repository for tests and one-off runs
#[derive(Debug, Default)]
pub struct InMemoryWeightRepository {
    weights: Mutex<BTreeMap<String, f64>>,
    saves: Mutex<usize>,
}

impl InMemoryWeightRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: BTreeMap<String, f64>) -> Self {
        Self {
            weights: Mutex::new(weights),
            saves: Mutex::new(0),
        }
    }

    /// Number of times `save` has been called
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl WeightRepository for InMemoryWeightRepository {
    fn load(&self) -> BTreeMap<String, f64> {
        self.weights.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn save(&self, weights: &BTreeMap<String, f64>) -> Result<(), WeightStoreError> {
        *self.weights.lock().unwrap_or_else(|e| e.into_inner()) = weights.clone();
        *self.saves.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }
}
