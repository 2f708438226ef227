use serde::{Deserialize, Serialize};

/// A decoded Nostr event as handed over by the subscription layer.
///
/// Field names follow NIP-01 JSON so relay dumps deserialize directly.
/// Signatures are not checked here; the client verified them on receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub pubkey: String,
    pub kind: u16,
    #[serde(default)]
    pub tags: Vec<Vec<String>>,
    /// Author-supplied, so neither monotonic nor unique
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
    #[serde(default)]
    pub content: String,
}

impl Event {
    pub fn new(id: impl Into<String>, pubkey: impl Into<String>, kind: u16) -> Self {
        Self {
            id: id.into(),
            pubkey: pubkey.into(),
            kind,
            tags: Vec::new(),
            created_at: None,
            content: String::new(),
        }
    }

    pub fn with_created_at(mut self, created_at: u64) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_tag<I, S>(mut self, tag: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.push(tag.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Timestamp used for ordering; missing means 0
    pub fn timestamp(&self) -> u64 {
        self.created_at.unwrap_or(0)
    }
}

impl From<&nostr_sdk::Event> for Event {
    fn from(event: &nostr_sdk::Event) -> Self {
        Self {
            id: event.id.to_hex(),
            pubkey: event.pubkey.to_hex(),
            kind: event.kind.as_u16(),
            tags: event.tags.iter().map(|tag| tag.as_slice().to_vec()).collect(),
            created_at: Some(event.created_at.as_u64()),
            content: event.content.clone(),
        }
    }
}

impl From<nostr_sdk::Event> for Event {
    fn from(event: nostr_sdk::Event) -> Self {
        Self::from(&event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nostr_sdk::prelude::{EventBuilder, Keys, Kind, Tag, TagKind};

    #[test]
    fn test_from_nostr_event() {
        let keys = Keys::generate();
        let signed = EventBuilder::new(Kind::from(513), "metadata")
            .tag(Tag::custom(
                TagKind::Custom(std::borrow::Cow::Borrowed("title")),
                vec!["My Title"],
            ))
            .sign_with_keys(&keys)
            .expect("Failed to sign event");

        let event = Event::from(&signed);
        assert_eq!(event.id, signed.id.to_hex());
        assert_eq!(event.pubkey, keys.public_key().to_hex());
        assert_eq!(event.kind, 513);
        assert_eq!(event.content, "metadata");
        assert_eq!(event.created_at, Some(signed.created_at.as_u64()));
        assert_eq!(event.tags, vec![vec!["title".to_string(), "My Title".to_string()]]);
    }

    #[test]
    fn test_deserialize_without_created_at() {
        let json = r#"{"id":"abc","pubkey":"def","kind":1,"tags":[["E","root"]]}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.created_at, None);
        assert_eq!(event.timestamp(), 0);
        assert_eq!(event.content, "");
        assert_eq!(event.tags[0], vec!["E", "root"]);
    }
}
