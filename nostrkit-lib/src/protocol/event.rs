//! Canonical protocol events and their content-addressed ids.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{Kind, Tag};
use crate::clock::Clock;
use crate::{NostrkitError, Result};

/// A Nostr event as produced or consumed by this layer.
///
/// ```json
/// {
///   "id": "5c83da77...",
///   "pubkey": "79be667e...",
///   "created_at": 1700000000,
///   "kind": 1059,
///   "tags": [["p", "c6047f94..."], ["delay", "5"]],
///   "content": "base64...",
///   "sig": ""
/// }
/// ```
///
/// `sig` is never populated here; an external signer fills it before the
/// event is published.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProtocolEvent {
    /// Lowercase hex SHA-256 of the canonical serialization.
    pub id: String,
    /// Author public key (64 hex characters, x-only).
    pub pubkey: String,
    /// Unix timestamp of creation.
    pub created_at: u64,
    /// Semantic type.
    pub kind: Kind,
    /// Ordered tags.
    pub tags: Vec<Tag>,
    /// Event content body.
    pub content: String,
    /// Schnorr signature, empty until signed externally.
    #[serde(default)]
    pub sig: String,
}

impl ProtocolEvent {
    /// Build an event at an explicit timestamp.
    pub fn new(
        kind: Kind,
        content: impl Into<String>,
        pubkey: impl Into<String>,
        tags: Vec<Tag>,
        created_at: u64,
    ) -> Result<Self> {
        let pubkey = pubkey.into();
        let content = content.into();
        let id = compute_event_id(&pubkey, created_at, kind, &tags, &content)?;
        Ok(Self {
            id,
            pubkey,
            created_at,
            kind,
            tags,
            content,
            sig: String::new(),
        })
    }

    /// Recompute the canonical id and compare it to `self.id`.
    pub fn verify_id(&self) -> Result<()> {
        let expected = compute_event_id(
            &self.pubkey,
            self.created_at,
            self.kind,
            &self.tags,
            &self.content,
        )?;
        if expected != self.id {
            return Err(NostrkitError::protocol(format!(
                "event id mismatch for kind {}",
                self.kind
            )));
        }
        Ok(())
    }

    pub fn has_valid_id(&self) -> bool {
        self.verify_id().is_ok()
    }

    /// First value of the first tag named `name`.
    pub fn first_tag_value(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.is_named(name))
            .and_then(Tag::value)
    }

    /// First value of every tag named `name`, in order.
    pub fn tag_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tags
            .iter()
            .filter(move |tag| tag.is_named(name))
            .filter_map(Tag::value)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Build an event stamped with the clock's current time.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(kind = %kind)))]
pub fn build_event(
    kind: Kind,
    content: impl Into<String>,
    pubkey: impl Into<String>,
    tags: Vec<Tag>,
    clock: &dyn Clock,
) -> Result<ProtocolEvent> {
    ProtocolEvent::new(kind, content, pubkey, tags, clock.now())
}

/// `hex(sha256(json([0, pubkey, created_at, kind, tags, content])))`
pub fn compute_event_id(
    pubkey: &str,
    created_at: u64,
    kind: Kind,
    tags: &[Tag],
    content: &str,
) -> Result<String> {
    let canonical = (0u8, pubkey, created_at, kind.as_u16(), tags, content);
    let bytes = serde_json::to_vec(&canonical)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
