use std::collections::HashSet;

use crate::config::ProtocolConfig;
use crate::inbox::{dedupe_by_tag, sort_by_created_at, SortOrder};
use crate::models::Event;

/// Sub-store for inbox events (events that reach the current user).
pub struct InboxStore {
    config: ProtocolConfig,
    items: Vec<Event>,
    read_ids: HashSet<String>,
}

impl InboxStore {
    pub fn new(config: ProtocolConfig) -> Self {
        Self {
            config,
            items: Vec::new(),
            read_ids: HashSet::new(),
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.read_ids.clear();
    }

    // ===== Getters =====

    /// All items, most recent first
    pub fn items(&self) -> &[Event] {
        &self.items
    }

    pub fn is_read(&self, id: &str) -> bool {
        self.read_ids.contains(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|i| i.id == id)
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|i| !self.read_ids.contains(&i.id)).count()
    }

    /// One entry per conversation root, newest first.
    /// Events outside any conversation are listed individually.
    pub fn latest_per_conversation(&self) -> Vec<&Event> {
        let mut latest = dedupe_by_tag(self.items.iter(), &self.config.tags.root_ref);
        sort_by_created_at(&mut latest, SortOrder::Descending);
        latest
    }

    // ===== Mutations =====

    /// Returns false if an event with the same id is already present.
    pub fn add(&mut self, event: Event) -> bool {
        if self.contains(&event.id) {
            return false;
        }
        // Insert sorted by created_at (most recent first); ties go after existing items
        let pos = self
            .items
            .partition_point(|i| i.timestamp() >= event.timestamp());
        self.items.insert(pos, event);
        true
    }

    /// Read state is kept for ids not seen yet, so marks survive a reload
    pub fn mark_read(&mut self, id: &str) {
        self.read_ids.insert(id.to_string());
    }
}

impl Default for InboxStore {
    fn default() -> Self {
        Self::new(ProtocolConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(id: &str, root: &str, created_at: u64) -> Event {
        Event::new(id, "agent", 1)
            .with_created_at(created_at)
            .with_tag(["E", root])
            .with_tag(["e", root])
    }

    #[test]
    fn test_add_dedups_and_orders() {
        let mut store = InboxStore::default();
        assert!(store.add(reply("a", "r1", 10)));
        assert!(store.add(reply("b", "r1", 30)));
        assert!(store.add(reply("c", "r2", 20)));
        assert!(!store.add(reply("a", "r1", 10)));

        let ids: Vec<&str> = store.items().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_equal_timestamps_keep_arrival_order() {
        let mut store = InboxStore::default();
        store.add(reply("first", "r1", 10));
        store.add(reply("second", "r2", 10));
        let ids: Vec<&str> = store.items().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn test_latest_per_conversation() {
        let mut store = InboxStore::default();
        store.add(reply("a", "r1", 10));
        store.add(reply("b", "r1", 30));
        store.add(reply("c", "r2", 20));
        store.add(Event::new("mention", "agent", 1).with_created_at(25));

        let ids: Vec<&str> = store
            .latest_per_conversation()
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "mention", "c"]);
    }

    #[test]
    fn test_read_tracking() {
        let mut store = InboxStore::default();
        store.mark_read("later");
        store.add(reply("now", "r1", 1));
        store.add(reply("later", "r1", 2));

        assert!(store.is_read("later"));
        assert!(!store.is_read("now"));
        assert_eq!(store.unread_count(), 1);

        store.clear();
        assert!(!store.is_read("later"));
        assert!(store.items().is_empty());
    }
}
