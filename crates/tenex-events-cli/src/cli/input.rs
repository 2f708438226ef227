use std::path::Path;

use anyhow::{Context, Result};
use tenex_events::Event;

/// Read events from a file holding either a JSON array or one event per line.
pub fn load_events(path: &Path) -> Result<Vec<Event>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read events file: {}", path.display()))?;
    parse_events(&content).with_context(|| format!("Failed to parse events file: {}", path.display()))
}

pub fn parse_events(content: &str) -> Result<Vec<Event>> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content).context("Invalid JSON array of events");
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid event on line {}", idx + 1))
        })
        .collect()
}
