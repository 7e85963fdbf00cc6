//! Agent panel from TOML (`[[agents]]` array)

use consensus_domain::{AgentDescriptor, GENERAL_TAG};
use serde::{Deserialize, Serialize};

/// One raw `[[agents]]` entry
///
/// # Example
///
/// ```toml
/// [[agents]]
/// id = "llama-node-1"
/// host = "10.0.0.11"
/// port = 11434
/// model = "llama3.1:8b"
/// base_weight = 1.2
/// topic_tags = ["math", "reasoning"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentEntry {
    pub id: String,
    pub host: String,
    pub port: u16,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub base_weight: f64,
    pub topic_tags: Vec<String>,
    pub enabled: bool,
}

impl Default for FileAgentEntry {
    fn default() -> Self {
        Self {
            id: String::new(),
            host: "127.0.0.1".to_string(),
            port: 11434,
            model: String::new(),
            temperature: 0.2,
            max_tokens: 256,
            base_weight: 1.0,
            topic_tags: vec![GENERAL_TAG.to_string()],
            enabled: true,
        }
    }
}

impl FileAgentEntry {
    pub fn to_descriptor(&self) -> AgentDescriptor {
        let mut descriptor = AgentDescriptor::new(self.id.trim(), self.model.trim())
            .with_endpoint(self.host.trim(), self.port)
            .with_base_weight(self.base_weight)
            .with_topic_tags(
                self.topic_tags
                    .iter()
                    .map(|t| t.trim().to_lowercase())
                    .filter(|t| !t.is_empty()),
            );
        descriptor.temperature = self.temperature;
        descriptor.max_tokens = self.max_tokens;
        descriptor.enabled = self.enabled;
        descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_entry_gets_defaults() {
        let entry: FileAgentEntry = toml::from_str(
            r#"
id = "a1"
model = "llama3.1:8b"
"#,
        )
        .unwrap();

        let agent = entry.to_descriptor();
        assert_eq!(agent.host, "127.0.0.1");
        assert_eq!(agent.port, 11434);
        assert_eq!(agent.max_tokens, 256);
        assert_eq!(agent.topic_tags, vec!["general"]);
        assert!(agent.enabled);
    }

    #[test]
    fn test_tags_are_normalized() {
        let entry = FileAgentEntry {
            id: "a1".to_string(),
            model: "m".to_string(),
            topic_tags: vec![" Math ".to_string(), "math".to_string(), "".to_string()],
            ..Default::default()
        };
        assert_eq!(entry.to_descriptor().topic_tags, vec!["math"]);
    }
}
