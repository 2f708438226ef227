//! Protocol constants
//!
//! Default kind numbers and tag names. Runtime code reads them through
//! [`crate::config::ProtocolConfig`] so a deployment can override them.

/// Window during which repeated stop commands for the same target are dropped
pub const STOP_THROTTLE_MS: u64 = 3000;

/// Upper bound on a single relay publish
pub const PUBLISH_TIMEOUT_MS: u64 = 5000;

/// Value of the NIP-89 `client` tag on events we publish
pub const CLIENT_NAME: &str = "tenex-events";

// Nostr event kinds used by TENEX
pub mod kinds {
    /// Conversation metadata (title, summary, status)
    pub const CONVERSATION_METADATA: u16 = 513;
    /// Operations status
    pub const OPERATIONS_STATUS: u16 = 24133;
    /// Stop operations command
    pub const STOP_OPERATIONS: u16 = 24134;
}

// Tag names
pub mod tags {
    /// Project coordinate
    pub const PROJECT: &str = "a";
    /// Direct event reference (reply target, conversation id, subject)
    pub const EVENT_REF: &str = "e";
    /// Root event reference (NIP-22 uppercase form)
    pub const ROOT_REF: &str = "E";
    /// Agent pubkey
    pub const AGENT: &str = "p";
    pub const TITLE: &str = "title";
    pub const SUMMARY: &str = "summary";
    pub const STATUS_LABEL: &str = "status-label";
    pub const STATUS_CURRENT_ACTIVITY: &str = "status-current-activity";
    /// NIP-89 client tag
    pub const CLIENT: &str = "client";
}
