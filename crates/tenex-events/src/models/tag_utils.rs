//! Tag extraction utilities for decoded events
//!
//! Tags stay as raw rows (`[name, value, ...]`) because the protocol allows
//! arbitrary unknown tags alongside the ones we understand. These helpers
//! give typed access with "first match wins" and "all matches" semantics.

use super::Event;

/// Extract a single value from a tag by name.
/// Returns the value of the first matching row, even if that row has no value.
pub fn get_tag_value<'a>(event: &'a Event, tag_name: &str) -> Option<&'a str> {
    event
        .tags
        .iter()
        .find(|tag| tag.first().map(String::as_str) == Some(tag_name))
        .and_then(|tag| tag.get(1))
        .map(String::as_str)
}

/// Extract all values for a given tag name, in tag order.
/// Useful for tags that appear multiple times (e.g., "p", "e").
pub fn get_all_tag_values<'a>(event: &'a Event, tag_name: &str) -> Vec<&'a str> {
    event
        .tags
        .iter()
        .filter(|tag| tag.first().map(String::as_str) == Some(tag_name))
        .filter_map(|tag| tag.get(1))
        .map(String::as_str)
        .collect()
}

/// Check if an event has a specific tag (regardless of value).
pub fn has_tag(event: &Event, tag_name: &str) -> bool {
    event
        .tags
        .iter()
        .any(|tag| tag.first().map(String::as_str) == Some(tag_name))
}
