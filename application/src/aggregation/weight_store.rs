//! Durable agent weight store
//!
//! Wraps the domain [`WeightTable`] with a mutex and a [`WeightRepository`].
//! The repository is read once when the store is opened and rewritten in
//! full after every mutation, while the lock is still held, so concurrent
//! feedback batches never lose each other's updates and the stored map
//! always matches a state that existed in memory.

use crate::ports::weight_repository::{
    InMemoryWeightRepository, WeightRepository, WeightStoreError,
};
use consensus_domain::{AgentDescriptor, LearningRule, WeightTable};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

pub struct WeightStore {
    repository: Arc<dyn WeightRepository>,
    table: Mutex<WeightTable>,
}

impl WeightStore {
    /// Open a store, loading whatever the repository currently holds
    pub fn open(repository: Arc<dyn WeightRepository>) -> Self {
        let weights = repository.load();
        debug!("Loaded {} stored agent weights", weights.len());
        Self {
            repository,
            table: Mutex::new(WeightTable::from_weights(weights)),
        }
    }

    /// Store backed by a volatile repository
    pub fn in_memory() -> Self {
        Self::open(Arc::new(InMemoryWeightRepository::new()))
    }

    fn lock(&self) -> MutexGuard<'_, WeightTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of every known weight
    pub fn weights(&self) -> BTreeMap<String, f64> {
        self.lock().weights()
    }

    pub fn weight(&self, agent_id: &str) -> Option<f64> {
        self.lock().weight(agent_id)
    }

    /// Correctness history of an agent, oldest first
    pub fn history(&self, agent_id: &str) -> Vec<u8> {
        self.lock()
            .record(agent_id)
            .map(|r| r.history().iter().copied().collect())
            .unwrap_or_default()
    }

    /// Fraction of correct answers in the agent's history
    pub fn accuracy(&self, agent_id: &str) -> Option<f64> {
        self.lock().record(agent_id).and_then(|r| r.accuracy())
    }

    /// Insert base weights for agents not seen before.
    ///
    /// Persists once if anything was inserted and returns the number of new
    /// entries.
    pub fn ensure_agents(&self, agents: &[AgentDescriptor]) -> Result<usize, WeightStoreError> {
        let mut table = self.lock();
        let inserted = agents
            .iter()
            .filter(|agent| table.ensure(&agent.id, agent.base_weight))
            .count();

        if inserted > 0 {
            debug!("Initialized weights for {} new agents", inserted);
            self.repository.save(&table.weights())?;
        }
        Ok(inserted)
    }

    /// Apply one batch of correctness outcomes and persist the result.
    ///
    /// The whole batch, including the write to the repository, runs under a
    /// single lock acquisition. Returns the weights after the batch.
    pub fn record_outcomes<'a, I>(
        &self,
        outcomes: I,
        rule: &LearningRule,
    ) -> Result<BTreeMap<String, f64>, WeightStoreError>
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let mut table = self.lock();
        for (agent_id, correct) in outcomes {
            let weight = table.record_outcome(agent_id, correct, rule);
            debug!("Agent {} correct={} weight={:.4}", agent_id, correct, weight);
        }
        let snapshot = table.weights();
        self.repository.save(&snapshot)?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_domain::WeightBounds;

    fn store_with(weights: &[(&str, f64)]) -> (Arc<InMemoryWeightRepository>, WeightStore) {
        let repo = Arc::new(InMemoryWeightRepository::with_weights(
            weights.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        ));
        let store = WeightStore::open(repo.clone());
        (repo, store)
    }

    #[test]
    fn test_open_loads_existing_weights() {
        let (_, store) = store_with(&[("a1", 2.5)]);
        assert_eq!(store.weight("a1"), Some(2.5));
        assert_eq!(store.weight("missing"), None);
    }

    #[test]
    fn test_ensure_agents_persists_only_when_inserting() {
        let (repo, store) = store_with(&[("a1", 2.5)]);
        let agents = vec![
            AgentDescriptor::new("a1", "m").with_base_weight(1.0),
            AgentDescriptor::new("a2", "m").with_base_weight(1.5),
        ];

        assert_eq!(store.ensure_agents(&agents).unwrap(), 1);
        assert_eq!(repo.save_count(), 1);
        // Existing weight is not reset to the base weight
        assert_eq!(store.weight("a1"), Some(2.5));
        assert_eq!(store.weight("a2"), Some(1.5));

        assert_eq!(store.ensure_agents(&agents).unwrap(), 0);
        assert_eq!(repo.save_count(), 1);
    }

    #[test]
    fn test_record_outcomes_updates_and_persists_once() {
        let (repo, store) = store_with(&[("a1", 1.0), ("a2", 1.0)]);
        let rule = LearningRule::new(0.2, WeightBounds::default());

        let weights = store
            .record_outcomes([("a1", true), ("a2", false)], &rule)
            .unwrap();

        assert!((weights["a1"] - 1.0).abs() < 1e-12);
        assert!((weights["a2"] - 0.8).abs() < 1e-12);
        assert_eq!(repo.save_count(), 1);
        assert_eq!(repo.load(), weights);
        assert_eq!(store.history("a2"), vec![0]);
        assert_eq!(store.accuracy("a1"), Some(1.0));
    }

    #[test]
    fn test_concurrent_batches_do_not_lose_updates() {
        let store = Arc::new(WeightStore::in_memory());
        let rule = LearningRule::new(0.2, WeightBounds::default());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        store.record_outcomes([("shared", false)], &rule).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.history("shared").len(), 200);
    }
}
