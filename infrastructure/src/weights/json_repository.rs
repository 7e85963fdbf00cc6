//! JSON file weight repository.
//!
//! The whole map is stored as one pretty-printed JSON object
//! (`{"agent_id": weight, ...}`), read once at startup and rewritten in full
//! on every save.

use consensus_application::ports::weight_repository::{WeightRepository, WeightStoreError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct JsonWeightRepository {
    path: PathBuf,
}

impl JsonWeightRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> WeightStoreError {
        WeightStoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl WeightRepository for JsonWeightRepository {
    fn load(&self) -> BTreeMap<String, f64> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No weight file at {}, starting empty", self.path.display());
                return BTreeMap::new();
            }
            Err(e) => {
                warn!("Could not read weights from {}: {}", self.path.display(), e);
                return BTreeMap::new();
            }
        };

        match serde_json::from_str::<BTreeMap<String, f64>>(&content) {
            Ok(weights) => weights,
            Err(e) => {
                warn!(
                    "Ignoring unparsable weight file {}: {}",
                    self.path.display(),
                    e
                );
                BTreeMap::new()
            }
        }
    }

    fn save(&self, weights: &BTreeMap<String, f64>) -> Result<(), WeightStoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(weights)
            .map_err(|e| WeightStoreError::Serialization(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonWeightRepository::new(dir.path().join("agent_weights.json"));
        assert!(repo.load().is_empty());
    }

    #[test]
    fn test_save_creates_parent_dirs_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("agent_weights.json");
        let repo = JsonWeightRepository::new(&path);

        let mut weights = BTreeMap::new();
        weights.insert("llama".to_string(), 1.25);
        weights.insert("qwen".to_string(), 0.5);
        repo.save(&weights).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n"));
        assert_eq!(JsonWeightRepository::new(&path).load(), weights);
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent_weights.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(JsonWeightRepository::new(&path).load().is_empty());
    }

    #[test]
    fn test_wrong_shape_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent_weights.json");
        std::fs::write(&path, r#"{"a": "heavy"}"#).unwrap();

        assert!(JsonWeightRepository::new(&path).load().is_empty());
    }
}
