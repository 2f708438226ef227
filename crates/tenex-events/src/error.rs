/// Reasons an event is rejected by one of the parsers.
///
/// These are recoverable: callers log them with the offending event id and
/// move on to the next event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    #[error("event {event_id} has kind {actual}, expected {expected}")]
    WrongKind {
        event_id: String,
        expected: u16,
        actual: u16,
    },

    #[error("event {event_id} is missing required `{tag}` tag")]
    MissingTag { event_id: String, tag: String },
}

impl EventError {
    /// Stable machine-readable reason
    pub fn reason_code(&self) -> &'static str {
        match self {
            EventError::WrongKind { .. } => "wrong_kind",
            EventError::MissingTag { .. } => "missing_tag",
        }
    }

    pub fn event_id(&self) -> &str {
        match self {
            EventError::WrongKind { event_id, .. } => event_id,
            EventError::MissingTag { event_id, .. } => event_id,
        }
    }
}
