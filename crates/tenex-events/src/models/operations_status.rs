use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::tag_utils::{get_all_tag_values, get_tag_value};
use super::Event;
use crate::config::ProtocolConfig;
use crate::error::EventError;

/// Represents an operations status event (Nostr kind:24133)
/// Published by the backend to indicate which agents are working on which events.
///
/// Structure:
/// - e-tag: event ID being processed
/// - p-tags (lowercase): agent pubkeys currently working
/// - a-tag: project coordinate
///
/// Each event is a complete picture for its subject; snapshots are never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSnapshot {
    pub target_project_id: String,
    pub subject_event_id: String,
    /// Deduplicated and sorted
    pub agent_pubkeys: BTreeSet<String>,
    pub created_at: u64,
    pub source_event_id: String,
}

impl OperationSnapshot {
    pub fn from_event(event: &Event, config: &ProtocolConfig) -> Result<Self, EventError> {
        if event.kind != config.kinds.operations_status {
            return Err(EventError::WrongKind {
                event_id: event.id.clone(),
                expected: config.kinds.operations_status,
                actual: event.kind,
            });
        }

        let missing = |tag: &str| EventError::MissingTag {
            event_id: event.id.clone(),
            tag: tag.to_string(),
        };

        let target_project_id = get_tag_value(event, &config.tags.project)
            .ok_or_else(|| missing(&config.tags.project))?;
        let subject_event_id = get_tag_value(event, &config.tags.event_ref)
            .ok_or_else(|| missing(&config.tags.event_ref))?;

        let agent_pubkeys = get_all_tag_values(event, &config.tags.agent)
            .into_iter()
            .map(str::to_string)
            .collect();

        Ok(OperationSnapshot {
            target_project_id: target_project_id.to_string(),
            subject_event_id: subject_event_id.to_string(),
            agent_pubkeys,
            created_at: event.timestamp(),
            source_event_id: event.id.clone(),
        })
    }

    /// Returns true if there are agents actively working
    pub fn is_active(&self) -> bool {
        !self.agent_pubkeys.is_empty()
    }
}
