//! Privacy-level aware send and receive.
//!
//! [`MessageDispatcher`] picks an envelope per privacy level, fans group
//! messages out to every member and recognises group messages again on the
//! receiving side.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::MessagingConfig;
use crate::envelope::{gift_wrap, pairwise, SealMetadata, WrapOptions};
use crate::group::{
    self, dedup_members, ChannelData, ChannelOptions, GroupMessageOptions,
};
use crate::keys::{Keys, SecretKey, Secp256k1Signer, Signer};
use crate::protocol::{build_event, Kind, ProtocolEvent, Tag};
use crate::{NostrkitError, Result};

pub use crate::privacy::PrivacyLevel;

/// Per-send options.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageOptions {
    /// Gift-wrap delay. `None` uses [`MessagingConfig::default_delay_minutes`].
    #[serde(default)]
    pub delay_minutes: Option<u32>,
    /// Seal metadata for gift-wrapped sends.
    #[serde(default)]
    pub metadata: SealMetadata,
}

impl MessageOptions {
    pub fn with_delay(mut self, minutes: u32) -> Self {
        self.delay_minutes = Some(minutes);
        self
    }

    pub fn with_metadata(mut self, metadata: SealMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// What the sender knows about an envelope it produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeMetadata {
    pub gift_wrapped: bool,
    pub privacy_level: PrivacyLevel,
    /// Label the caller asked for, e.g. `"standard"` for an `Encrypted` send.
    pub requested_level: String,
    pub recipient: String,
    /// Earliest publication time.
    pub delivery_time: u64,
    pub requires_approval: bool,
    /// Seal id, gift-wrapped sends only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seal_id: Option<String>,
}

/// An event ready for publication plus its envelope metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedMessage {
    pub event: ProtocolEvent,
    pub metadata: EnvelopeMetadata,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptionMetadata {
    pub gift_wrapped: bool,
    pub is_group_message: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seal_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptedMessage {
    /// Plaintext, or the group message content when one was detected.
    pub message: String,
    pub sender: String,
    pub timestamp: u64,
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_message: Option<ProtocolEvent>,
    pub metadata: DecryptionMetadata,
}

/// Input to [`MessageDispatcher::send_group_message`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMessageData {
    pub channel_id: String,
    pub content: String,
    pub members: Vec<String>,
    #[serde(default)]
    pub options: GroupMessageOptions,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientDelivery {
    pub recipient: String,
    pub message: EncryptedMessage,
}

/// A member whose envelope could not be built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientFailure {
    pub recipient: String,
    pub error: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDeliveryMetadata {
    /// Distinct members addressed.
    pub member_count: usize,
    /// True when gift wraps carry a non-zero delay.
    pub delayed: bool,
    pub requires_approval: bool,
    pub privacy_level: PrivacyLevel,
}

/// Outcome of a group fan-out.
///
/// `deliveries` and `failures` together cover every distinct member exactly
/// once, in member order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDelivery {
    pub group_message: ProtocolEvent,
    pub deliveries: Vec<RecipientDelivery>,
    pub failures: Vec<RecipientFailure>,
    pub metadata: GroupDeliveryMetadata,
}

impl GroupDelivery {
    /// Gift-wrap events, one per successful member.
    pub fn gift_wrapped_messages(&self) -> impl Iterator<Item = &ProtocolEvent> + '_ {
        self.deliveries
            .iter()
            .filter(|d| d.message.metadata.gift_wrapped)
            .map(|d| &d.message.event)
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of [`MessageDispatcher::create_group`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCreation {
    /// Kind 40 channel event.
    pub channel: ProtocolEvent,
    /// The channel event encrypted to its creator.
    pub self_envelope: EncryptedMessage,
}

/// Entry point for sending and receiving private messages.
///
/// Holds no mutable state; clone it freely.
#[derive(Clone)]
pub struct MessageDispatcher {
    signer: Arc<dyn Signer>,
    clock: Arc<dyn Clock>,
    config: MessagingConfig,
}

impl Default for MessageDispatcher {
    fn default() -> Self {
        Self::new(MessagingConfig::default())
    }
}

impl MessageDispatcher {
    /// Dispatcher with the in-process signer and the system clock.
    pub fn new(config: MessagingConfig) -> Self {
        Self::with_capabilities(Arc::new(Secp256k1Signer), Arc::new(SystemClock), config)
    }

    pub fn with_capabilities(
        signer: Arc<dyn Signer>,
        clock: Arc<dyn Clock>,
        config: MessagingConfig,
    ) -> Self {
        Self {
            signer,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &MessagingConfig {
        &self.config
    }

    /// Encrypt `message` for one recipient at the given privacy level.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, fields(recipient = %recipient_pubkey, level = %privacy_level.as_ref()))
    )]
    pub async fn encrypt_message(
        &self,
        message: &str,
        recipient_pubkey: &str,
        sender: &Keys,
        privacy_level: impl AsRef<str>,
        options: &MessageOptions,
    ) -> Result<EncryptedMessage> {
        let requested = privacy_level.as_ref();
        let level = PrivacyLevel::parse(requested)?;
        self.encrypt_with_level(message, recipient_pubkey, sender, level, requested, options)
            .await
    }

    async fn encrypt_with_level(
        &self,
        message: &str,
        recipient_pubkey: &str,
        sender: &Keys,
        level: PrivacyLevel,
        requested: &str,
        options: &MessageOptions,
    ) -> Result<EncryptedMessage> {
        let requires_approval = options.metadata.requires_approval.unwrap_or(false);

        match level {
            PrivacyLevel::GiftWrapped => {
                let wrap_options = WrapOptions {
                    delay_minutes: options
                        .delay_minutes
                        .unwrap_or(self.config.default_delay_minutes),
                    metadata: options.metadata.clone(),
                };
                let wrapped = gift_wrap::wrap(
                    message,
                    recipient_pubkey,
                    sender,
                    &wrap_options,
                    self.signer.as_ref(),
                    self.clock.as_ref(),
                )
                .await?;

                Ok(EncryptedMessage {
                    event: wrapped.event,
                    metadata: EnvelopeMetadata {
                        gift_wrapped: true,
                        privacy_level: level,
                        requested_level: requested.to_string(),
                        recipient: recipient_pubkey.to_string(),
                        delivery_time: wrapped.delivery_time,
                        requires_approval,
                        seal_id: Some(wrapped.seal_id),
                    },
                })
            }
            PrivacyLevel::Encrypted => {
                let content = pairwise::encrypt(message, recipient_pubkey, sender.secret_key())?;
                let event = build_event(
                    Kind::EncryptedDirectMessage,
                    content,
                    sender.public_key(),
                    vec![Tag::pubkey(recipient_pubkey)],
                    self.clock.as_ref(),
                )?;
                let delivery_time = event.created_at;

                Ok(EncryptedMessage {
                    event,
                    metadata: EnvelopeMetadata {
                        gift_wrapped: false,
                        privacy_level: level,
                        requested_level: requested.to_string(),
                        recipient: recipient_pubkey.to_string(),
                        delivery_time,
                        requires_approval,
                        seal_id: None,
                    },
                })
            }
        }
    }

    /// Open an envelope produced by [`encrypt_message`](Self::encrypt_message)
    /// or a group fan-out.
    ///
    /// For pairwise envelopes the counterpart is `sender_pubkey` when given,
    /// otherwise the event author. A plaintext that parses as a kind 42 event
    /// with a valid id is reported as a group message; anything else is
    /// returned as plain text.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(id = %encrypted.event.id)))]
    pub fn decrypt_message(
        &self,
        encrypted: &EncryptedMessage,
        recipient_secret: &SecretKey,
        sender_pubkey: Option<&str>,
    ) -> Result<DecryptedMessage> {
        let (plaintext, sender, timestamp, tags, seal_id) = if encrypted.metadata.gift_wrapped {
            let opened = gift_wrap::unwrap(&encrypted.event, recipient_secret)?;
            (
                opened.message,
                opened.sender,
                opened.timestamp,
                opened.tags,
                Some(opened.seal_id),
            )
        } else {
            let event = &encrypted.event;
            let counterpart = sender_pubkey.unwrap_or(&event.pubkey);
            let plaintext = pairwise::decrypt(&event.content, counterpart, recipient_secret)?;
            (
                plaintext,
                event.pubkey.clone(),
                event.created_at,
                event.tags.clone(),
                None,
            )
        };

        let group_message = detect_group_message(&plaintext);
        let message = match &group_message {
            Some(group) => group.content.clone(),
            None => plaintext,
        };

        Ok(DecryptedMessage {
            message,
            sender,
            timestamp,
            tags,
            metadata: DecryptionMetadata {
                gift_wrapped: encrypted.metadata.gift_wrapped,
                is_group_message: group_message.is_some(),
                seal_id,
            },
            group_message,
        })
    }

    /// Build a group message and encrypt it separately for every member.
    ///
    /// The privacy level is checked before anything is built. Members are
    /// deduplicated; per-member failures are collected in
    /// [`GroupDelivery::failures`] and never affect other members.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, fields(channel = %message_data.channel_id, level = %privacy_level.as_ref()))
    )]
    pub async fn send_group_message(
        &self,
        message_data: &GroupMessageData,
        sender: &Keys,
        privacy_level: impl AsRef<str>,
        options: &MessageOptions,
    ) -> Result<GroupDelivery> {
        let requested = privacy_level.as_ref();
        let level = PrivacyLevel::parse(requested)?;

        let members = dedup_members(&message_data.members);
        if members.is_empty() {
            return Err(NostrkitError::invalid_input(
                "members",
                "at least one member is required",
            ));
        }
        if members.len() > self.config.max_group_members {
            return Err(NostrkitError::invalid_input(
                "members",
                format!(
                    "{} members exceeds the limit of {}",
                    members.len(),
                    self.config.max_group_members
                ),
            ));
        }

        let group_message = group::create_group_message(
            &message_data.content,
            &message_data.channel_id,
            sender.public_key(),
            &members,
            &message_data.options,
            self.clock.as_ref(),
        )?;
        let payload = group_message.to_json()?;

        let mut member_options = options.clone();
        if member_options.metadata.requires_approval.is_none() && message_data.options.requires_approval {
            member_options.metadata.requires_approval = Some(true);
        }
        let delay = member_options
            .delay_minutes
            .unwrap_or(self.config.default_delay_minutes);

        let member_count = members.len();
        let mut outcomes: Vec<(usize, String, Result<EncryptedMessage>)> =
            stream::iter(members.into_iter().enumerate())
                .map(|(index, member)| {
                    let payload = payload.as_str();
                    let member_options = &member_options;
                    async move {
                        let outcome = self
                            .encrypt_with_level(payload, &member, sender, level, requested, member_options)
                            .await;
                        (index, member, outcome)
                    }
                })
                .buffer_unordered(self.config.effective_concurrency())
                .collect()
                .await;
        outcomes.sort_by_key(|(index, _, _)| *index);

        let mut deliveries = Vec::with_capacity(member_count);
        let mut failures = Vec::new();
        for (_, recipient, outcome) in outcomes {
            match outcome {
                Ok(message) => deliveries.push(RecipientDelivery { recipient, message }),
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("envelope for member {recipient} failed: {err}");
                    failures.push(RecipientFailure {
                        recipient,
                        error: err.to_string(),
                    });
                }
            }
        }

        Ok(GroupDelivery {
            group_message,
            deliveries,
            failures,
            metadata: GroupDeliveryMetadata {
                member_count,
                delayed: level == PrivacyLevel::GiftWrapped && delay > 0,
                requires_approval: message_data.options.requires_approval,
                privacy_level: level,
            },
        })
    }

    /// Create a channel and an envelope of it addressed to the creator, so
    /// the creator's other devices can discover the group.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(name = %channel_data.name)))]
    pub async fn create_group(
        &self,
        channel_data: &ChannelData,
        sender: &Keys,
        options: &ChannelOptions,
    ) -> Result<GroupCreation> {
        let channel =
            group::create_group_channel(channel_data, sender.public_key(), options, self.clock.as_ref())?;

        let envelope_options = MessageOptions {
            delay_minutes: Some(0),
            metadata: SealMetadata {
                family_id: channel_data.federation_id.clone(),
                ..SealMetadata::default()
            },
        };
        let self_envelope = self
            .encrypt_with_level(
                &channel.to_json()?,
                sender.public_key(),
                sender,
                channel_data.privacy_level,
                channel_data.privacy_level.as_str(),
                &envelope_options,
            )
            .await?;

        Ok(GroupCreation {
            channel,
            self_envelope,
        })
    }
}

fn detect_group_message(plaintext: &str) -> Option<ProtocolEvent> {
    let event = ProtocolEvent::from_json(plaintext).ok()?;
    (event.kind == Kind::ChannelMessage && event.has_valid_id()).then_some(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    const NOW: u64 = 1_700_000_000;

    fn dispatcher() -> MessageDispatcher {
        MessageDispatcher::with_capabilities(
            Arc::new(Secp256k1Signer),
            Arc::new(FixedClock(NOW)),
            MessagingConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_giftwrapped_send_uses_default_delay() {
        let alice = Keys::generate();
        let bob = Keys::generate();

        let sent = dispatcher()
            .encrypt_message("hello family", bob.public_key(), &alice, "giftwrapped", &MessageOptions::default())
            .await
            .unwrap();

        assert_eq!(sent.event.kind, Kind::GiftWrap);
        assert!(sent.metadata.gift_wrapped);
        assert_eq!(sent.metadata.delivery_time, NOW + 300);
        assert!(sent.metadata.seal_id.is_some());

        let opened = dispatcher().decrypt_message(&sent, bob.secret_key(), None).unwrap();
        assert_eq!(opened.message, "hello family");
        assert_eq!(opened.sender, alice.public_key());
        assert!(!opened.metadata.is_group_message);
        assert_eq!(opened.metadata.seal_id, sent.metadata.seal_id);
    }

    #[tokio::test]
    async fn test_standard_is_encrypted_direct_message() {
        let alice = Keys::generate();
        let bob = Keys::generate();

        let sent = dispatcher()
            .encrypt_message("hi", bob.public_key(), &alice, "standard", &MessageOptions::default())
            .await
            .unwrap();

        assert_eq!(sent.event.kind, Kind::EncryptedDirectMessage);
        assert_eq!(sent.event.pubkey, alice.public_key());
        assert_eq!(sent.event.first_tag_value("p"), Some(bob.public_key()));
        assert_eq!(sent.metadata.privacy_level, PrivacyLevel::Encrypted);
        assert_eq!(sent.metadata.requested_level, "standard");
        assert_eq!(sent.metadata.delivery_time, NOW);

        let opened = dispatcher()
            .decrypt_message(&sent, bob.secret_key(), Some(alice.public_key()))
            .unwrap();
        assert_eq!(opened.message, "hi");
        assert!(!opened.metadata.gift_wrapped);
    }

    #[tokio::test]
    async fn test_unknown_level_rejected() {
        let alice = Keys::generate();
        let err = dispatcher()
            .encrypt_message("hi", alice.public_key(), &alice, "bogus", &MessageOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, NostrkitError::UnknownPrivacyLevel("bogus".into()));
    }

    #[tokio::test]
    async fn test_plain_json_is_not_a_group_message() {
        let alice = Keys::generate();
        let bob = Keys::generate();
        let note = ProtocolEvent::new(Kind::TextNote, "not a group", alice.public_key(), vec![], NOW)
            .unwrap();

        let sent = dispatcher()
            .encrypt_message(&note.to_json().unwrap(), bob.public_key(), &alice, "encrypted", &MessageOptions::default())
            .await
            .unwrap();
        let opened = dispatcher().decrypt_message(&sent, bob.secret_key(), None).unwrap();

        assert!(!opened.metadata.is_group_message);
        assert!(opened.group_message.is_none());
        assert_eq!(opened.message, note.to_json().unwrap());
    }

    #[tokio::test]
    async fn test_group_send_rejects_empty_and_oversized() {
        let alice = Keys::generate();
        let mut data = GroupMessageData {
            channel_id: "ab".repeat(32),
            content: "hi".into(),
            members: vec![],
            options: GroupMessageOptions::default(),
        };

        let err = dispatcher()
            .send_group_message(&data, &alice, "giftwrapped", &MessageOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, NostrkitError::InvalidInput { .. }));

        data.members = (0..3).map(|_| Keys::generate().public_key().to_string()).collect();
        let small = MessageDispatcher::with_capabilities(
            Arc::new(Secp256k1Signer),
            Arc::new(FixedClock(NOW)),
            MessagingConfig::default().with_max_group_members(2),
        );
        let err = small
            .send_group_message(&data, &alice, "giftwrapped", &MessageOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, NostrkitError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_create_group_self_envelope() {
        let alice = Keys::generate();
        let data = ChannelData::new("Smiths", group::GroupType::Family).with_admin(alice.public_key());

        let created = dispatcher()
            .create_group(&data, &alice, &ChannelOptions::default())
            .await
            .unwrap();

        assert_eq!(created.channel.kind, Kind::ChannelCreation);
        assert_eq!(created.self_envelope.metadata.recipient, alice.public_key());
        assert_eq!(created.self_envelope.metadata.delivery_time, NOW);

        let opened = dispatcher()
            .decrypt_message(&created.self_envelope, alice.secret_key(), None)
            .unwrap();
        assert_eq!(ProtocolEvent::from_json(&opened.message).unwrap(), created.channel);
    }
}
