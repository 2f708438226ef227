use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::ProtocolConfig;
use crate::error::EventError;
use crate::models::conversation_metadata::MetadataUpdate;
use crate::models::{ConversationMetadata, Event, MetadataField, TimestampedValue};

/// Result of applying one metadata event.
pub type MetadataOutcome = Result<MetadataApplied, EventError>;

/// Successful application; `updated` is empty when every field was stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataApplied {
    pub conversation_id: String,
    pub updated: Vec<(MetadataField, TimestampedValue)>,
}

/// Summary of a batch replay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub applied: usize,
    pub rejected: Vec<EventError>,
}

/// Sub-store for conversation metadata (kind:513).
/// In-memory only, rebuilt from events.
pub struct ConversationMetadataStore {
    config: ProtocolConfig,
    by_conversation: HashMap<String, ConversationMetadata>,
}

impl ConversationMetadataStore {
    pub fn new(config: ProtocolConfig) -> Self {
        Self {
            config,
            by_conversation: HashMap::new(),
        }
    }

    pub fn clear(&mut self) {
        self.by_conversation.clear();
    }

    // ===== Event Handlers =====

    /// Apply a single metadata event. Malformed events leave the store untouched.
    pub fn apply(&mut self, event: &Event) -> MetadataOutcome {
        let update = MetadataUpdate::from_event(event, &self.config)?;

        let current = self.by_conversation.get(&update.conversation_id);
        let mut next = current
            .cloned()
            .unwrap_or_else(|| ConversationMetadata::new(update.conversation_id.clone()));
        let updated = next.apply(&update);

        if updated.is_empty() {
            debug!(
                event_id = %event.id,
                conversation_id = %update.conversation_id,
                "Ignoring stale conversation metadata"
            );
        } else {
            self.by_conversation.insert(update.conversation_id.clone(), next);
        }

        Ok(MetadataApplied {
            conversation_id: update.conversation_id,
            updated,
        })
    }

    /// Apply every event in order. Rejections are logged and collected;
    /// they never stop the rest of the batch.
    pub fn apply_batch<'a, I>(&mut self, events: I) -> BatchReport
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut report = BatchReport::default();
        for event in events {
            match self.apply(event) {
                Ok(_) => report.applied += 1,
                Err(e) => {
                    warn!(event_id = %e.event_id(), reason = e.reason_code(), "Skipping metadata event: {}", e);
                    report.rejected.push(e);
                }
            }
        }
        report
    }

    // ===== Query Methods =====

    pub fn get(&self, conversation_id: &str) -> Option<&ConversationMetadata> {
        self.by_conversation.get(conversation_id)
    }

    pub fn title(&self, conversation_id: &str) -> Option<&str> {
        self.get(conversation_id)
            .and_then(|m| m.title.as_ref())
            .map(|t| t.value.as_str())
    }

    pub fn summary(&self, conversation_id: &str) -> Option<&str> {
        self.get(conversation_id)
            .and_then(|m| m.summary.as_ref())
            .map(|s| s.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_conversation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_conversation.is_empty()
    }

    /// All records, sorted by conversation id
    pub fn iter(&self) -> impl Iterator<Item = &ConversationMetadata> {
        let mut records: Vec<&ConversationMetadata> = self.by_conversation.values().collect();
        records.sort_by(|a, b| a.conversation_id.cmp(&b.conversation_id));
        records.into_iter()
    }
}

impl Default for ConversationMetadataStore {
    fn default() -> Self {
        Self::new(ProtocolConfig::default())
    }
}
