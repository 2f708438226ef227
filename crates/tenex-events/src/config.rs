use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{kinds, tags, PUBLISH_TIMEOUT_MS, STOP_THROTTLE_MS};

/// Kind numbers and tag names the processing core keys on.
///
/// Every field has a default matching the current TENEX protocol, so a JSON
/// override only needs the fields that differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProtocolConfig {
    pub kinds: KindConfig,
    pub tags: TagConfig,
    pub stop_throttle_ms: u64,
    pub publish_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KindConfig {
    pub conversation_metadata: u16,
    pub operations_status: u16,
    pub stop_operations: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TagConfig {
    pub project: String,
    pub event_ref: String,
    pub root_ref: String,
    pub agent: String,
    pub title: String,
    pub summary: String,
    pub status_label: String,
    pub status_current_activity: String,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            kinds: KindConfig::default(),
            tags: TagConfig::default(),
            stop_throttle_ms: STOP_THROTTLE_MS,
            publish_timeout_ms: PUBLISH_TIMEOUT_MS,
        }
    }
}

impl Default for KindConfig {
    fn default() -> Self {
        Self {
            conversation_metadata: kinds::CONVERSATION_METADATA,
            operations_status: kinds::OPERATIONS_STATUS,
            stop_operations: kinds::STOP_OPERATIONS,
        }
    }
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            project: tags::PROJECT.to_string(),
            event_ref: tags::EVENT_REF.to_string(),
            root_ref: tags::ROOT_REF.to_string(),
            agent: tags::AGENT.to_string(),
            title: tags::TITLE.to_string(),
            summary: tags::SUMMARY.to_string(),
            status_label: tags::STATUS_LABEL.to_string(),
            status_current_activity: tags::STATUS_CURRENT_ACTIVITY.to_string(),
        }
    }
}

impl ProtocolConfig {
    /// Load config from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to deserialize protocol config")
    }

    pub fn stop_throttle(&self) -> Duration {
        Duration::from_millis(self.stop_throttle_ms)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_protocol() {
        let config = ProtocolConfig::default();
        assert_eq!(config.kinds.conversation_metadata, 513);
        assert_eq!(config.kinds.operations_status, 24133);
        assert_eq!(config.kinds.stop_operations, 24134);
        assert_eq!(config.tags.root_ref, "E");
        assert_eq!(config.tags.event_ref, "e");
        assert_eq!(config.stop_throttle(), Duration::from_millis(3000));
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{
            "stopThrottleMs": 500,
            "kinds": { "operationsStatus": 24200 },
            "tags": { "title": "name" }
        }"#;
        let config = ProtocolConfig::from_json(json).unwrap();
        assert_eq!(config.stop_throttle_ms, 500);
        assert_eq!(config.kinds.operations_status, 24200);
        assert_eq!(config.kinds.conversation_metadata, 513);
        assert_eq!(config.tags.title, "name");
        assert_eq!(config.tags.summary, "summary");
        assert_eq!(config.publish_timeout_ms, PUBLISH_TIMEOUT_MS);
    }

    #[test]
    fn test_parse_minimal() {
        let config = ProtocolConfig::from_json("{}").unwrap();
        assert_eq!(config, ProtocolConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"tags": {{"rootRef": "root"}}}}"#).unwrap();

        let config = ProtocolConfig::load(file.path()).unwrap();
        assert_eq!(config.tags.root_ref, "root");
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = ProtocolConfig::load("/nonexistent/tenex-events.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
