use anyhow::{Context, Result};
use futures::future::BoxFuture;
use nostr_sdk::prelude::*;
use tracing::debug;

use super::dispatcher::{StopPublisher, StopRequest};
use crate::config::ProtocolConfig;
use crate::constants::{tags, CLIENT_NAME};

const CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Build and sign a stop operations command (kind:24134).
///
/// One project tag, one event-reference tag per target, and one agent tag
/// per pubkey (none means stop every agent on those events).
///
/// The project id must be a `kind:pubkey:identifier` coordinate and every
/// agent must be a valid pubkey; otherwise nothing is signed.
pub fn build_stop_event(
    request: &StopRequest,
    keys: &Keys,
    config: &ProtocolConfig,
) -> Result<nostr_sdk::Event> {
    Coordinate::parse(&request.project_id)
        .map_err(|e| anyhow::anyhow!("Invalid project coordinate {}: {}", request.project_id, e))?;

    let mut event = EventBuilder::new(Kind::Custom(config.kinds.stop_operations), "")
        .tag(
            Tag::parse([config.tags.project.as_str(), request.project_id.as_str()])
                .context("Invalid project tag")?,
        )
        // NIP-89 client tag
        .tag(Tag::custom(
            TagKind::Custom(std::borrow::Cow::Borrowed(tags::CLIENT)),
            vec![CLIENT_NAME.to_string()],
        ));

    for event_id in &request.event_ids {
        event = event.tag(
            Tag::parse([config.tags.event_ref.as_str(), event_id.as_str()])
                .context("Invalid event tag")?,
        );
    }

    // An empty agent list means every agent, so bad keys are an error
    for agent_pk in &request.agent_pubkeys {
        let pk = PublicKey::parse(agent_pk)
            .map_err(|e| anyhow::anyhow!("Invalid agent pubkey {}: {}", agent_pk, e))?;
        event = event.tag(
            Tag::parse([config.tags.agent.as_str(), pk.to_hex().as_str()])
                .context("Invalid agent tag")?,
        );
    }

    event
        .sign_with_keys(keys)
        .context("Failed to sign stop command")
}

/// Publishes stop commands to the connected relays.
pub struct RelayStopPublisher {
    client: Client,
    keys: Keys,
    config: ProtocolConfig,
}

impl RelayStopPublisher {
    pub fn new(client: Client, keys: Keys, config: ProtocolConfig) -> Self {
        Self {
            client,
            keys,
            config,
        }
    }

    /// Create a client for `relay_url` and connect it.
    pub async fn connect(relay_url: &str, keys: Keys, config: ProtocolConfig) -> Result<Self> {
        let client = Client::builder().signer(keys.clone()).build();
        client
            .add_relay(relay_url)
            .await
            .with_context(|| format!("Failed to add relay {}", relay_url))?;

        tokio::time::timeout(CONNECT_TIMEOUT, client.connect())
            .await
            .map_err(|_| anyhow::anyhow!("Connection to {} timed out after {:?}", relay_url, CONNECT_TIMEOUT))?;
        Ok(Self::new(client, keys, config))
    }

    pub async fn disconnect(&self) {
        self.client.disconnect().await;
    }

    async fn send(&self, request: &StopRequest) -> Result<()> {
        let signed_event = build_stop_event(request, &self.keys, &self.config)?;

        // Send to relay with timeout
        match tokio::time::timeout(
            self.config.publish_timeout(),
            self.client.send_event(&signed_event),
        )
        .await
        {
            Ok(Ok(output)) => {
                debug!(event_id = %output.id(), "Sent stop command");
                Ok(())
            }
            Ok(Err(e)) => Err(anyhow::Error::new(e).context("Failed to send stop command to relay")),
            Err(_) => Err(anyhow::anyhow!("Timeout sending stop command to relay")),
        }
    }
}

impl StopPublisher for RelayStopPublisher {
    fn publish_stop<'a>(&'a self, request: &'a StopRequest) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.send(request))
    }
}
