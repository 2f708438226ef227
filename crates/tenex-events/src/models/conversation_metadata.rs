use serde::{Deserialize, Serialize};

use super::tag_utils::get_tag_value;
use super::Event;
use crate::config::ProtocolConfig;
use crate::error::EventError;

/// A field value together with the `created_at` of the event that set it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampedValue {
    pub value: String,
    pub timestamp: u64,
}

/// Latest-wins fields carried by kind:513 events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    Title,
    Summary,
    /// e.g. "In Progress", "Blocked", "Done"
    StatusLabel,
    /// e.g. "Writing tests..."
    StatusCurrentActivity,
}

impl MetadataField {
    pub const ALL: [MetadataField; 4] = [
        MetadataField::Title,
        MetadataField::Summary,
        MetadataField::StatusLabel,
        MetadataField::StatusCurrentActivity,
    ];

    pub fn tag_name<'a>(&self, config: &'a ProtocolConfig) -> &'a str {
        match self {
            MetadataField::Title => &config.tags.title,
            MetadataField::Summary => &config.tags.summary,
            MetadataField::StatusLabel => &config.tags.status_label,
            MetadataField::StatusCurrentActivity => &config.tags.status_current_activity,
        }
    }
}

/// Per-conversation projection of all metadata events seen so far.
///
/// Each field advances independently: a stored timestamp never goes down,
/// whatever order the events arrive in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMetadata {
    pub conversation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<TimestampedValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<TimestampedValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_label: Option<TimestampedValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_current_activity: Option<TimestampedValue>,
}

/// The field values one metadata event carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataUpdate {
    pub event_id: String,
    pub conversation_id: String,
    pub fields: Vec<(MetadataField, TimestampedValue)>,
}

impl MetadataUpdate {
    /// Parse a conversation metadata event.
    ///
    /// The conversation id comes from the first event-reference tag and is
    /// required. Field tags are optional; an event may carry any subset.
    pub fn from_event(event: &Event, config: &ProtocolConfig) -> Result<Self, EventError> {
        if event.kind != config.kinds.conversation_metadata {
            return Err(EventError::WrongKind {
                event_id: event.id.clone(),
                expected: config.kinds.conversation_metadata,
                actual: event.kind,
            });
        }

        let conversation_id = get_tag_value(event, &config.tags.event_ref).ok_or_else(|| {
            EventError::MissingTag {
                event_id: event.id.clone(),
                tag: config.tags.event_ref.clone(),
            }
        })?;

        let timestamp = event.timestamp();
        let fields = MetadataField::ALL
            .iter()
            .filter_map(|field| {
                get_tag_value(event, field.tag_name(config)).map(|value| {
                    (
                        *field,
                        TimestampedValue {
                            value: value.to_string(),
                            timestamp,
                        },
                    )
                })
            })
            .collect();

        Ok(Self {
            event_id: event.id.clone(),
            conversation_id: conversation_id.to_string(),
            fields,
        })
    }
}

impl ConversationMetadata {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            ..Default::default()
        }
    }

    pub fn field(&self, field: MetadataField) -> Option<&TimestampedValue> {
        match field {
            MetadataField::Title => self.title.as_ref(),
            MetadataField::Summary => self.summary.as_ref(),
            MetadataField::StatusLabel => self.status_label.as_ref(),
            MetadataField::StatusCurrentActivity => self.status_current_activity.as_ref(),
        }
    }

    fn field_mut(&mut self, field: MetadataField) -> &mut Option<TimestampedValue> {
        match field {
            MetadataField::Title => &mut self.title,
            MetadataField::Summary => &mut self.summary,
            MetadataField::StatusLabel => &mut self.status_label,
            MetadataField::StatusCurrentActivity => &mut self.status_current_activity,
        }
    }

    pub fn is_empty(&self) -> bool {
        MetadataField::ALL.iter().all(|f| self.field(*f).is_none())
    }

    /// Fold one update into this record.
    ///
    /// A field is overwritten when it is unset or the incoming timestamp is
    /// greater than or equal to the stored one. Returns the fields written.
    pub fn apply(&mut self, update: &MetadataUpdate) -> Vec<(MetadataField, TimestampedValue)> {
        let mut written = Vec::new();
        for (field, incoming) in &update.fields {
            let slot = self.field_mut(*field);
            let newer = match slot {
                Some(current) => incoming.timestamp >= current.timestamp,
                None => true,
            };
            if newer {
                *slot = Some(incoming.clone());
                written.push((*field, incoming.clone()));
            }
        }
        written
    }

    /// Pure reducer form of [`apply`](Self::apply).
    ///
    /// An update for a different conversation leaves `current` unchanged.
    pub fn reduce(current: Option<&ConversationMetadata>, update: &MetadataUpdate) -> ConversationMetadata {
        match current {
            Some(current) if current.conversation_id != update.conversation_id => current.clone(),
            Some(current) => {
                let mut next = current.clone();
                next.apply(update);
                next
            }
            None => {
                let mut next = ConversationMetadata::new(update.conversation_id.clone());
                next.apply(update);
                next
            }
        }
    }
}
