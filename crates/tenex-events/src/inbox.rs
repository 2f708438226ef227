//! Deduplication and ordering of inbox/conversation events.

use std::borrow::Borrow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::tag_utils::get_tag_value;
use crate::models::Event;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    /// Newest first
    #[default]
    Descending,
}

/// Keep at most one event per value of `tag_name`, the most recently created.
///
/// Grouping uses the first `tag_name` row of each event. Events without that
/// tag, or whose first such row has no value, are never grouped and all pass
/// through.
///
/// On a `created_at` tie the event encountered first is kept. Survivors come
/// out in the order their group was first seen; callers sort afterwards.
pub fn dedupe_by_tag<E, I>(events: I, tag_name: &str) -> Vec<E>
where
    E: Borrow<Event>,
    I: IntoIterator<Item = E>,
{
    let mut survivors: Vec<E> = Vec::new();
    let mut slot_by_key: HashMap<String, usize> = HashMap::new();

    for event in events {
        let key = get_tag_value(event.borrow(), tag_name).map(str::to_string);
        let Some(key) = key else {
            survivors.push(event);
            continue;
        };

        match slot_by_key.get(&key) {
            Some(&slot) => {
                if event.borrow().timestamp() > survivors[slot].borrow().timestamp() {
                    survivors[slot] = event;
                }
            }
            None => {
                slot_by_key.insert(key, survivors.len());
                survivors.push(event);
            }
        }
    }

    survivors
}

/// Stable sort by `created_at`; a missing timestamp sorts as 0.
pub fn sort_by_created_at<E: Borrow<Event>>(events: &mut [E], order: SortOrder) {
    match order {
        SortOrder::Ascending => events.sort_by_key(|e| e.borrow().timestamp()),
        SortOrder::Descending => {
            events.sort_by(|a, b| b.borrow().timestamp().cmp(&a.borrow().timestamp()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, root: Option<&str>, created_at: Option<u64>) -> Event {
        let mut event = Event::new(id, "author", 1);
        event.created_at = created_at;
        if let Some(root) = root {
            event = event.with_tag(["E", root]);
        }
        event
    }

    fn ids<E: Borrow<Event>>(events: &[E]) -> Vec<&str> {
        events.iter().map(|e| e.borrow().id.as_str()).collect()
    }

    #[test]
    fn test_keeps_newest_per_group() {
        let events = vec![
            event("a", Some("x"), Some(10)),
            event("b", Some("x"), Some(20)),
            event("c", None, Some(5)),
        ];

        let mut result = ids(&dedupe_by_tag(&events, "E"))
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        result.sort();
        assert_eq!(result, vec!["b", "c"]);
    }

    #[test]
    fn test_untagged_events_all_pass_through() {
        let events = vec![
            event("a", None, Some(1)),
            event("b", None, Some(1)),
            event("c", None, Some(2)),
        ];
        assert_eq!(ids(&dedupe_by_tag(events, "E")), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_lowercase_tag_is_not_the_grouping_key() {
        let events = vec![
            Event::new("a", "author", 1).with_tag(["e", "x"]).with_created_at(1),
            Event::new("b", "author", 1).with_tag(["e", "x"]).with_created_at(2),
        ];
        assert_eq!(dedupe_by_tag(&events, "E").len(), 2);
        assert_eq!(ids(&dedupe_by_tag(&events, "e")), vec!["b"]);
    }

    #[test]
    fn test_valueless_first_row_leaves_event_ungrouped() {
        let events = vec![
            Event::new("a", "author", 1)
                .with_tag(["E"])
                .with_tag(["E", "x"])
                .with_created_at(1),
            event("b", Some("x"), Some(2)),
        ];
        assert_eq!(ids(&dedupe_by_tag(&events, "E")), vec!["a", "b"]);
    }

    #[test]
    fn test_tie_keeps_first_encountered() {
        let events = vec![
            event("first", Some("x"), Some(10)),
            event("second", Some("x"), Some(10)),
        ];
        assert_eq!(ids(&dedupe_by_tag(&events, "E")), vec!["first"]);

        let reversed: Vec<&Event> = events.iter().rev().collect();
        assert_eq!(ids(&dedupe_by_tag(reversed, "E")), vec!["second"]);
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let events = vec![
            event("a", Some("x"), Some(3)),
            event("b", Some("y"), Some(8)),
            event("c", Some("x"), Some(9)),
            event("d", None, Some(1)),
            event("e", Some("y"), Some(2)),
            event("f", Some("x"), None),
        ];

        let once = dedupe_by_tag(events, "E");
        let twice = dedupe_by_tag(once.clone(), "E");
        assert_eq!(once, twice);
        assert_eq!(ids(&once), vec!["c", "b", "d"]);
    }

    #[test]
    fn test_sort_descending_is_stable() {
        let mut events = vec![
            event("a", None, Some(5)),
            event("b", None, Some(7)),
            event("c", None, Some(5)),
            event("d", None, Some(7)),
        ];
        sort_by_created_at(&mut events, SortOrder::Descending);
        assert_eq!(ids(&events), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_sort_ascending_missing_timestamp_first() {
        let mut events = vec![
            event("a", None, Some(5)),
            event("b", None, None),
            event("c", None, Some(1)),
        ];
        sort_by_created_at(&mut events, SortOrder::Ascending);
        assert_eq!(ids(&events), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_default_order_is_newest_first() {
        assert_eq!(SortOrder::default(), SortOrder::Descending);
    }
}
