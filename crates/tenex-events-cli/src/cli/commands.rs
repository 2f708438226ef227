use anyhow::{bail, Result};
use serde_json::{json, Value};
use tenex_events::{
    dedupe_by_tag, sort_by_created_at, ConversationMetadataStore, Event, OperationsStore,
    ProtocolConfig, SortOrder, StopDispatcher, StopOutcome, StopPublisher,
};

/// Latest event per `tag` value, sorted by time.
pub fn run_dedupe(events: Vec<Event>, tag: &str, order: SortOrder) -> Value {
    let mut survivors = dedupe_by_tag(events, tag);
    sort_by_created_at(&mut survivors, order);
    json!(survivors)
}

/// Replay metadata events; other kinds in the input are ignored.
pub fn run_metadata(events: &[Event], config: &ProtocolConfig) -> Value {
    let mut store = ConversationMetadataStore::new(config.clone());
    let report = store.apply_batch(
        events
            .iter()
            .filter(|e| e.kind == config.kinds.conversation_metadata),
    );

    let skipped: Vec<Value> = report
        .rejected
        .iter()
        .map(|e| json!({ "eventId": e.event_id(), "reason": e.reason_code() }))
        .collect();

    json!({
        "conversations": store.iter().collect::<Vec<_>>(),
        "applied": report.applied,
        "skipped": skipped,
    })
}

/// Replay operations status events and list what is still running.
pub fn run_operations(events: &[Event], config: &ProtocolConfig, project: Option<&str>) -> Value {
    let mut store = OperationsStore::new(config.clone());
    for event in events
        .iter()
        .filter(|e| e.kind == config.kinds.operations_status)
    {
        store.handle_operations_status_event(event);
    }

    let operations: Vec<_> = store
        .all_active()
        .into_iter()
        .filter(|s| project.map_or(true, |p| s.target_project_id == p))
        .collect();

    json!({ "operations": operations })
}

/// Stop targets must be hex event ids
fn validate_event_id(id: &str) -> Result<()> {
    match hex::decode(id) {
        Ok(bytes) if bytes.len() == 32 => Ok(()),
        _ => bail!("Invalid event id (expected 64 hex chars): {}", id),
    }
}

/// Check stop targets before any relay connection is made.
pub fn validate_stop_targets(event_ids: &[String]) -> Result<()> {
    if event_ids.is_empty() {
        bail!("At least one event id is required");
    }
    event_ids.iter().try_for_each(|id| validate_event_id(id))
}

pub async fn run_stop<P: StopPublisher>(
    dispatcher: &StopDispatcher<P>,
    project_id: &str,
    event_ids: &[String],
    agent_pubkeys: &[String],
) -> Result<StopOutcome> {
    validate_stop_targets(event_ids)?;
    Ok(dispatcher
        .stop_targets(project_id, event_ids, agent_pubkeys)
        .await)
}

/// A throttled stop is a no-op, not an error; only a failed publish is.
pub fn stop_succeeded(outcome: &StopOutcome) -> bool {
    !outcome.is_failed()
}

pub fn outcome_to_json(outcome: &StopOutcome) -> Value {
    match outcome {
        StopOutcome::Sent { event_ids } => json!({ "status": "sent", "eventIds": event_ids }),
        StopOutcome::Throttled => json!({ "status": "throttled" }),
        StopOutcome::Failed { event_ids, error } => {
            json!({ "status": "failed", "eventIds": event_ids, "error": error })
        }
    }
}
