use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::throttle::StopThrottle;
use crate::config::ProtocolConfig;

/// What a stop command asks the backend to halt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopRequest {
    pub project_id: String,
    pub event_ids: Vec<String>,
    /// Empty means every agent working on the events
    #[serde(default)]
    pub agent_pubkeys: Vec<String>,
}

/// Outbound side of the stop command.
///
/// Implementations return `Err` on transport failure; the dispatcher turns
/// that into [`StopOutcome::Failed`].
pub trait StopPublisher: Send + Sync {
    fn publish_stop<'a>(&'a self, request: &'a StopRequest) -> BoxFuture<'a, anyhow::Result<()>>;
}

impl<T: StopPublisher + ?Sized> StopPublisher for Arc<T> {
    fn publish_stop<'a>(&'a self, request: &'a StopRequest) -> BoxFuture<'a, anyhow::Result<()>> {
        (**self).publish_stop(request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    Sent { event_ids: Vec<String> },
    /// Every target was stopped within the throttle window; nothing published
    Throttled,
    /// Publish failed; the targets still consumed their throttle window
    Failed { event_ids: Vec<String>, error: String },
}

impl StopOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, StopOutcome::Sent { .. })
    }

    pub fn is_throttled(&self) -> bool {
        matches!(self, StopOutcome::Throttled)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StopOutcome::Failed { .. })
    }
}

/// Sends stop commands, at most once per throttle window per target id.
///
/// Suppressed calls return immediately; nothing is queued or retried.
pub struct StopDispatcher<P> {
    publisher: P,
    throttle: StopThrottle,
}

impl<P: StopPublisher> StopDispatcher<P> {
    pub fn new(publisher: P, config: &ProtocolConfig) -> Self {
        Self {
            publisher,
            throttle: StopThrottle::new(config.stop_throttle()),
        }
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn throttle(&self) -> &StopThrottle {
        &self.throttle
    }

    /// Stop all agents working on a single event or conversation.
    pub async fn stop(&self, project_id: &str, target_id: &str) -> StopOutcome {
        self.stop_targets(project_id, &[target_id.to_string()], &[]).await
    }

    /// Stop several targets in one command. Throttled ids are dropped from
    /// the request; if none remain nothing is published.
    pub async fn stop_targets(
        &self,
        project_id: &str,
        target_ids: &[String],
        agent_pubkeys: &[String],
    ) -> StopOutcome {
        let event_ids: Vec<String> = target_ids
            .iter()
            .filter(|id| {
                let acquired = self.throttle.try_acquire(id);
                if !acquired {
                    debug!(target_id = %id, "Stop command throttled");
                }
                acquired
            })
            .cloned()
            .collect();

        if event_ids.is_empty() {
            return StopOutcome::Throttled;
        }

        let request = StopRequest {
            project_id: project_id.to_string(),
            event_ids,
            agent_pubkeys: agent_pubkeys.to_vec(),
        };

        match self.publisher.publish_stop(&request).await {
            Ok(()) => {
                info!(
                    project_id = %request.project_id,
                    targets = request.event_ids.len(),
                    "Sent stop command"
                );
                StopOutcome::Sent {
                    event_ids: request.event_ids,
                }
            }
            Err(e) => {
                error!(project_id = %request.project_id, "Failed to send stop command: {:#}", e);
                StopOutcome::Failed {
                    event_ids: request.event_ids,
                    error: format!("{:#}", e),
                }
            }
        }
    }
}
