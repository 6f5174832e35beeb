//! Seal and gift-wrap envelopes (NIP-59 style).
//!
//! ```text
//! GiftWrap (kind 1059)  pubkey = ephemeral, tags = [p, delay]
//!   content = pairwise(ephemeral -> recipient, Seal JSON)
//!   Seal (kind 13)      pubkey = real sender, tags = [p, family?, approval?, expiry?]
//!     content = plaintext
//! ```
//!
//! Relays only ever see the outer event: a single-use key, the recipient and
//! a delay hint. The real sender is recoverable only by the recipient.

use serde::{Deserialize, Serialize};

use super::pairwise;
use crate::clock::Clock;
use crate::keys::{derive_public_key, Keys, SecretKey, Signer};
use crate::protocol::tags::{self, Tag};
use crate::protocol::{Kind, ProtocolEvent};
use crate::{NostrkitError, Result};

/// Optional metadata carried on the seal.
///
/// Each field becomes a seal tag only when set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealMetadata {
    /// Family federation the message belongs to.
    pub family_id: Option<String>,
    /// Whether a guardian must approve the message.
    pub requires_approval: Option<bool>,
    /// Unix timestamp after which the message is stale.
    pub expiry: Option<u64>,
}

impl SealMetadata {
    fn tags(&self) -> Vec<Tag> {
        let mut out = Vec::new();
        if let Some(family) = &self.family_id {
            out.push(Tag::new([tags::FAMILY, family.as_str()]));
        }
        if let Some(approval) = self.requires_approval {
            out.push(Tag::new([tags::APPROVAL.to_string(), approval.to_string()]));
        }
        if let Some(expiry) = self.expiry {
            out.push(Tag::new([tags::EXPIRY.to_string(), expiry.to_string()]));
        }
        out
    }
}

/// Parameters for [`wrap`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrapOptions {
    /// Minutes the relay-publishing collaborator should hold the event.
    pub delay_minutes: u32,
    /// Seal metadata.
    #[serde(default)]
    pub metadata: SealMetadata,
}

impl WrapOptions {
    pub fn with_delay(delay_minutes: u32) -> Self {
        Self {
            delay_minutes,
            metadata: SealMetadata::default(),
        }
    }
}

/// Result of wrapping one message for one recipient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrappedEnvelope {
    /// The kind 1059 event to publish.
    pub event: ProtocolEvent,
    /// Id of the inner seal, useful for deduplication on the receiving side.
    pub seal_id: String,
    /// Single-use key that authored `event`.
    pub ephemeral_pubkey: String,
    /// Earliest Unix time at which `event` should be published.
    pub delivery_time: u64,
}

/// Contents recovered from a gift wrap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnwrappedMessage {
    /// Plaintext message.
    pub message: String,
    /// Real sender public key, taken from the seal.
    pub sender: String,
    /// Seal creation time.
    pub timestamp: u64,
    /// Seal tags (recipient plus metadata).
    pub tags: Vec<Tag>,
    /// Id of the seal.
    pub seal_id: String,
}

/// Seal `message` for `recipient_pubkey` and wrap it under a fresh ephemeral
/// identity.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, fields(recipient = %recipient_pubkey, delay = options.delay_minutes))
)]
pub async fn wrap(
    message: &str,
    recipient_pubkey: &str,
    sender: &Keys,
    options: &WrapOptions,
    signer: &dyn Signer,
    clock: &dyn Clock,
) -> Result<WrappedEnvelope> {
    let now = clock.now();

    let mut seal_tags = vec![Tag::pubkey(recipient_pubkey)];
    seal_tags.extend(options.metadata.tags());
    let seal = ProtocolEvent::new(Kind::Seal, message, sender.public_key(), seal_tags, now)?;

    let ephemeral = signer.generate_ephemeral().await?;
    if ephemeral.public_key() == sender.public_key() {
        return Err(NostrkitError::protocol(
            "ephemeral identity must differ from the sender",
        ));
    }

    let wrapped_content = pairwise::encrypt(&seal.to_json()?, recipient_pubkey, ephemeral.secret_key())?;
    let wrap_tags = vec![
        Tag::pubkey(recipient_pubkey),
        Tag::new([tags::DELAY.to_string(), options.delay_minutes.to_string()]),
    ];
    let event = ProtocolEvent::new(
        Kind::GiftWrap,
        wrapped_content,
        ephemeral.public_key(),
        wrap_tags,
        now,
    )?;

    Ok(WrappedEnvelope {
        event,
        seal_id: seal.id,
        ephemeral_pubkey: ephemeral.public_key().to_string(),
        delivery_time: now.saturating_add(u64::from(options.delay_minutes) * 60),
    })
}

/// Open a gift wrap addressed to the holder of `recipient_secret`.
///
/// # Errors
///
/// - `ProtocolViolation` when the event is not a gift wrap, has no `p` tag,
///   is addressed to someone else, fails its id check, or holds something
///   other than a seal.
/// - `CryptoOperation` when the wrap fails to decrypt into an event.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(id = %gift_wrap.id)))]
pub fn unwrap(gift_wrap: &ProtocolEvent, recipient_secret: &SecretKey) -> Result<UnwrappedMessage> {
    if gift_wrap.kind != Kind::GiftWrap {
        return Err(NostrkitError::protocol(format!(
            "expected kind {}, got {}",
            Kind::GiftWrap,
            gift_wrap.kind
        )));
    }

    let addressed_to = gift_wrap
        .first_tag_value(tags::PUBKEY)
        .ok_or_else(|| NostrkitError::protocol("gift wrap has no p tag"))?;
    if !addressed_to.eq_ignore_ascii_case(&derive_public_key(recipient_secret)) {
        return Err(NostrkitError::protocol(
            "gift wrap is addressed to a different recipient",
        ));
    }
    gift_wrap.verify_id()?;

    let seal_json = pairwise::decrypt(&gift_wrap.content, &gift_wrap.pubkey, recipient_secret)?;
    let seal = ProtocolEvent::from_json(&seal_json)
        .map_err(|_| NostrkitError::crypto("decrypted gift wrap payload is not an event"))?;
    if seal.kind != Kind::Seal {
        return Err(NostrkitError::protocol(format!(
            "gift wrap holds kind {} instead of a seal",
            seal.kind
        )));
    }
    seal.verify_id()?;

    Ok(UnwrappedMessage {
        message: seal.content,
        sender: seal.pubkey,
        timestamp: seal.created_at,
        tags: seal.tags,
        seal_id: seal.id,
    })
}

/// Publication time requested by a gift wrap's `delay` tag.
///
/// `None` when the event has no parseable delay or the delay overflows.
pub fn requested_delivery_time(gift_wrap: &ProtocolEvent) -> Option<u64> {
    let minutes: u64 = gift_wrap.first_tag_value(tags::DELAY)?.parse().ok()?;
    gift_wrap.created_at.checked_add(minutes.checked_mul(60)?)
}
