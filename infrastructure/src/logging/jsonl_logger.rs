//! JSONL query metrics writer.
//!
//! Each [`QueryEvent`] is serialized as a single JSON line with a `type`
//! field and a `timestamp`, appended to the metrics file. The file is opened
//! in append mode so records from every run accumulate in one place.

use consensus_application::ports::query_logger::{QueryEvent, QueryLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL query logger that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every record and
/// on `Drop`.
pub struct JsonlQueryLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlQueryLogger {
    /// Open (or create) the log file at the given path.
    ///
    /// Creates parent directories as needed. Returns `None` if the file
    /// cannot be opened; the caller falls back to not logging.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create query log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open query log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(event: QueryEvent) -> Value {
        let mut map = match event.payload {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        map.insert(
            "type".to_string(),
            Value::String(event.event_type.to_string()),
        );
        map.entry("timestamp").or_insert_with(|| {
            Value::String(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
        });
        Value::Object(map)
    }
}

impl QueryLogger for JsonlQueryLogger {
    fn log(&self, event: QueryEvent) {
        let record = Self::record(event);
        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                warn!("Could not serialize query log record: {}", e);
                return;
            }
        };

        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            warn!("Could not write query log {}: {}", self.path.display(), e);
        }
    }
}

impl Drop for JsonlQueryLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_record_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("query_metrics.jsonl");
        let logger = JsonlQueryLogger::open(&path).unwrap();

        logger.log(QueryEvent::new(
            "consensus",
            json!({"query_id": "q1", "dependent_variables": {"aggregate_answer": "4"}}),
        ));
        logger.log(QueryEvent::new("feedback", json!({"ground_truth": "4"})));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["type"], "consensus");
        assert_eq!(records[0]["query_id"], "q1");
        assert!(records[0]["timestamp"].is_string());
        assert_eq!(records[1]["type"], "feedback");
    }

    #[test]
    fn test_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");

        for i in 0..2 {
            let logger = JsonlQueryLogger::open(&path).unwrap();
            logger.log(QueryEvent::new("consensus", json!({"run": i})));
        }

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["run"], 1);
    }

    #[test]
    fn test_keeps_existing_timestamp_and_wraps_scalars() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");
        let logger = JsonlQueryLogger::open(&path).unwrap();

        logger.log(QueryEvent::new(
            "consensus",
            json!({"timestamp": "2024-01-01T00:00:00Z"}),
        ));
        logger.log(QueryEvent::new("note", json!("plain")));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records[0]["timestamp"], "2024-01-01T00:00:00Z");
        assert_eq!(records[1]["data"], "plain");
    }
}
