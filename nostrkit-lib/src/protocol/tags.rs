//! Event tags and the tag names used by this crate.

use serde::{Deserialize, Serialize};

/// Recipient or member public key.
pub const PUBKEY: &str = "p";
/// Referenced event id.
pub const EVENT: &str = "e";
/// Group id for NIP-29 admin requests.
pub const GROUP: &str = "h";
/// Requested delivery delay in minutes.
pub const DELAY: &str = "delay";
/// Family federation the seal belongs to.
pub const FAMILY: &str = "family";
/// Whether the sealed message requires approval.
pub const APPROVAL: &str = "approval";
/// Unix timestamp after which the sealed message is stale.
pub const EXPIRY: &str = "expiry";
/// `family` or `peer`.
pub const GROUP_TYPE: &str = "group-type";
/// Privacy level label of a channel.
pub const PRIVACY_LEVEL: &str = "privacy-level";
/// Channel administrator.
pub const ADMIN: &str = "admin";
/// Linked federation id.
pub const FEDERATION: &str = "federation";
/// Family channels: whether guardians can see the channel.
pub const GUARDIAN_OVERSIGHT: &str = "guardian-oversight";
/// Family channels: spending context.
pub const SPENDING_CONTEXT: &str = "spending-context";
/// Peer channels: trust level between peers.
pub const TRUST_LEVEL: &str = "trust-level";
/// Peer channels: relationship label.
pub const RELATIONSHIP: &str = "relationship";
/// Message priority.
pub const PRIORITY: &str = "priority";
/// Present when a guardian must approve the message.
pub const GUARDIAN_APPROVAL: &str = "guardian-approval";
/// Present on emergency messages.
pub const EMERGENCY: &str = "emergency";

/// NIP-10 marker for the root reference of an `e` tag.
pub const ROOT_MARKER: &str = "root";

/// A Nostr tag: a name followed by its values.
///
/// Stored verbatim so unknown tags survive a round trip. `["p", "ab.."]` is
/// `Tag(vec!["p".into(), "ab..".into()])`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Tag(pub Vec<String>);

impl Tag {
    /// Build a tag from any sequence of string-like parts.
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// `["p", pubkey]`
    pub fn pubkey(pubkey: impl Into<String>) -> Self {
        Self(vec![PUBKEY.to_string(), pubkey.into()])
    }

    /// `["e", event_id, "", "root"]`
    pub fn root_event(event_id: impl Into<String>) -> Self {
        Self(vec![
            EVENT.to_string(),
            event_id.into(),
            String::new(),
            ROOT_MARKER.to_string(),
        ])
    }

    /// Tag name, the first element.
    pub fn name(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// First value after the name.
    pub fn value(&self) -> Option<&str> {
        self.0.get(1).map(String::as_str)
    }

    /// Element at `index`, counting the name as 0.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name() == Some(name)
    }
}
