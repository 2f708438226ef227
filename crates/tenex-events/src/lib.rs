//! Event processing core for TENEX conversations.
//!
//! Everything here works on already-decoded [`Event`] values: deduplication
//! and ordering of inbox events, latest-wins conversation metadata,
//! operations status snapshots and a throttled stop command dispatcher.

pub mod config;
pub mod constants;
pub mod error;
pub mod inbox;
pub mod models;
pub mod nostr;
pub mod store;

pub use config::{KindConfig, ProtocolConfig, TagConfig};
pub use error::EventError;
pub use inbox::{dedupe_by_tag, sort_by_created_at, SortOrder};
pub use models::{ConversationMetadata, Event, MetadataField, OperationSnapshot, TimestampedValue};
pub use nostr::{RelayStopPublisher, StopDispatcher, StopOutcome, StopPublisher, StopRequest, StopThrottle};
pub use store::{ConversationMetadataStore, InboxStore, MetadataOutcome, OperationsStore};
