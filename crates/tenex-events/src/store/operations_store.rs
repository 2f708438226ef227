use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::config::ProtocolConfig;
use crate::models::{Event, OperationSnapshot};

/// Sub-store for operations status (kind:24133).
///
/// Holds the latest snapshot per subject event. A newer snapshot replaces
/// the previous one outright; one with no agents clears the subject.
pub struct OperationsStore {
    config: ProtocolConfig,
    /// Maps subject event_id -> latest snapshot (which agents are working on it)
    operations_by_event: HashMap<String, OperationSnapshot>,
    /// Last accepted timestamp per subject, kept after removal so stale
    /// "working" snapshots cannot resurrect a finished operation
    last_seen: HashMap<String, u64>,
}

impl OperationsStore {
    pub fn new(config: ProtocolConfig) -> Self {
        Self {
            config,
            operations_by_event: HashMap::new(),
            last_seen: HashMap::new(),
        }
    }

    pub fn clear(&mut self) {
        self.operations_by_event.clear();
        self.last_seen.clear();
    }

    // ===== Event Handlers =====

    /// Parse and upsert. Returns false for malformed or stale events.
    pub fn handle_operations_status_event(&mut self, event: &Event) -> bool {
        match OperationSnapshot::from_event(event, &self.config) {
            Ok(snapshot) => self.upsert(snapshot),
            Err(e) => {
                warn!(event_id = %e.event_id(), reason = e.reason_code(), "Skipping operations status: {}", e);
                false
            }
        }
    }

    pub fn upsert(&mut self, snapshot: OperationSnapshot) -> bool {
        if let Some(&last) = self.last_seen.get(&snapshot.subject_event_id) {
            if last > snapshot.created_at {
                debug!(
                    subject = %snapshot.subject_event_id,
                    source = %snapshot.source_event_id,
                    "Ignoring stale operations status"
                );
                return false;
            }
        }
        self.last_seen
            .insert(snapshot.subject_event_id.clone(), snapshot.created_at);

        if snapshot.is_active() {
            self.operations_by_event
                .insert(snapshot.subject_event_id.clone(), snapshot);
        } else {
            self.operations_by_event.remove(&snapshot.subject_event_id);
        }
        true
    }

    // ===== Query Methods =====

    pub fn get(&self, event_id: &str) -> Option<&OperationSnapshot> {
        self.operations_by_event.get(event_id)
    }

    pub fn working_agents(&self, event_id: &str) -> Vec<String> {
        self.operations_by_event
            .get(event_id)
            .map(|s| s.agent_pubkeys.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_event_busy(&self, event_id: &str) -> bool {
        self.operations_by_event
            .get(event_id)
            .map(OperationSnapshot::is_active)
            .unwrap_or(false)
    }

    fn active_in_project<'a>(
        &'a self,
        project_id: &'a str,
    ) -> impl Iterator<Item = &'a OperationSnapshot> + 'a {
        self.operations_by_event
            .values()
            .filter(move |s| s.target_project_id == project_id && s.is_active())
    }

    pub fn active_operations_count(&self, project_id: &str) -> usize {
        self.active_in_project(project_id).count()
    }

    pub fn active_event_ids(&self, project_id: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .active_in_project(project_id)
            .map(|s| s.subject_event_id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Union of agents across the project's active operations, sorted
    pub fn project_working_agents(&self, project_id: &str) -> Vec<String> {
        let agents: BTreeSet<&String> = self
            .active_in_project(project_id)
            .flat_map(|s| s.agent_pubkeys.iter())
            .collect();
        agents.into_iter().cloned().collect()
    }

    pub fn is_project_busy(&self, project_id: &str) -> bool {
        self.active_in_project(project_id).next().is_some()
    }

    /// Active operations, oldest first
    pub fn all_active(&self) -> Vec<&OperationSnapshot> {
        let mut operations: Vec<&OperationSnapshot> = self
            .operations_by_event
            .values()
            .filter(|s| s.is_active())
            .collect();
        operations.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.subject_event_id.cmp(&b.subject_event_id))
        });
        operations
    }

    pub fn active_operations_total(&self) -> usize {
        self.operations_by_event.len()
    }
}

impl Default for OperationsStore {
    fn default() -> Self {
        Self::new(ProtocolConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = "31933:owner:project";

    fn status(id: &str, subject: &str, created_at: u64, agents: &[&str]) -> Event {
        let mut event = Event::new(id, "backend", 24133)
            .with_created_at(created_at)
            .with_tag(["a", PROJECT])
            .with_tag(["e", subject]);
        for agent in agents {
            event = event.with_tag(["p", *agent]);
        }
        event
    }

    #[test]
    fn test_latest_snapshot_replaces() {
        let mut store = OperationsStore::default();
        assert!(store.handle_operations_status_event(&status("s1", "conv", 10, &["a1", "a2"])));
        assert!(store.handle_operations_status_event(&status("s2", "conv", 11, &["a3"])));

        assert_eq!(store.working_agents("conv"), vec!["a3"]);
        assert_eq!(store.get("conv").unwrap().source_event_id, "s2");
    }

    #[test]
    fn test_stale_snapshot_ignored() {
        let mut store = OperationsStore::default();
        store.handle_operations_status_event(&status("s2", "conv", 20, &["a1"]));
        assert!(!store.handle_operations_status_event(&status("s1", "conv", 10, &["a2"])));
        assert_eq!(store.working_agents("conv"), vec!["a1"]);
    }

    #[test]
    fn test_empty_snapshot_clears_and_blocks_stale_resurrection() {
        let mut store = OperationsStore::default();
        store.handle_operations_status_event(&status("s1", "conv", 10, &["a1"]));
        store.handle_operations_status_event(&status("s3", "conv", 30, &[]));
        assert!(!store.is_event_busy("conv"));

        assert!(!store.handle_operations_status_event(&status("s2", "conv", 20, &["a1"])));
        assert!(!store.is_event_busy("conv"));
        assert_eq!(store.active_operations_total(), 0);
    }

    #[test]
    fn test_malformed_status_rejected() {
        let mut store = OperationsStore::default();
        let event = Event::new("bad", "backend", 24133).with_tag(["p", "a1"]);
        assert!(!store.handle_operations_status_event(&event));
        assert!(store.all_active().is_empty());
    }

    #[test]
    fn test_project_queries() {
        let mut store = OperationsStore::default();
        store.handle_operations_status_event(&status("s1", "conv1", 10, &["b", "a"]));
        store.handle_operations_status_event(&status("s2", "conv2", 5, &["c", "a"]));
        store.upsert(OperationSnapshot {
            target_project_id: "31933:owner:other".to_string(),
            subject_event_id: "conv3".to_string(),
            agent_pubkeys: ["z".to_string()].into_iter().collect(),
            created_at: 1,
            source_event_id: "s3".to_string(),
        });

        assert!(store.is_project_busy(PROJECT));
        assert_eq!(store.active_operations_count(PROJECT), 2);
        assert_eq!(store.active_event_ids(PROJECT), vec!["conv1", "conv2"]);
        assert_eq!(store.project_working_agents(PROJECT), vec!["a", "b", "c"]);
        assert!(!store.is_project_busy("31933:owner:missing"));

        let order: Vec<&str> = store
            .all_active()
            .iter()
            .map(|s| s.subject_event_id.as_str())
            .collect();
        assert_eq!(order, vec!["conv3", "conv2", "conv1"]);
    }
}
