//! Group channels (NIP-28 style) and membership requests (NIP-29 style).
//!
//! Every builder here returns a plain [`ProtocolEvent`]. Encryption and
//! fan-out to members happen in the [dispatcher](crate::dispatcher).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::clock::Clock;
use crate::privacy::PrivacyLevel;
use crate::protocol::tags::{self, Tag};
use crate::protocol::{build_event, is_hex32, Kind, ProtocolEvent};
use crate::{NostrkitError, Result};

/// Who a channel is for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    #[default]
    Family,
    Peer,
}

impl GroupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Family => "family",
            Self::Peer => "peer",
        }
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessagePriority {
    Low,
    #[default]
    Normal,
    High,
    Emergency,
}

impl MessagePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Emergency => "emergency",
        }
    }
}

impl fmt::Display for MessagePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description of a channel to create.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelData {
    pub name: String,
    #[serde(default)]
    pub about: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default)]
    pub group_type: GroupType,
    #[serde(default)]
    pub privacy_level: PrivacyLevel,
    /// Linked family federation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub federation_id: Option<String>,
    /// Administrator public keys. Each one becomes an `admin` tag.
    #[serde(default)]
    pub admins: Vec<String>,
}

impl ChannelData {
    pub fn new(name: impl Into<String>, group_type: GroupType) -> Self {
        Self {
            name: name.into(),
            about: String::new(),
            picture: None,
            group_type,
            privacy_level: PrivacyLevel::default(),
            federation_id: None,
            admins: Vec::new(),
        }
    }

    pub fn with_about(mut self, about: impl Into<String>) -> Self {
        self.about = about.into();
        self
    }

    pub fn with_privacy_level(mut self, level: PrivacyLevel) -> Self {
        self.privacy_level = level;
        self
    }

    pub fn with_federation(mut self, federation_id: impl Into<String>) -> Self {
        self.federation_id = Some(federation_id.into());
        self
    }

    pub fn with_admin(mut self, pubkey: impl Into<String>) -> Self {
        self.admins.push(pubkey.into());
        self
    }
}

/// JSON body of a kind 40 channel event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelContent {
    pub name: String,
    pub about: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub group_type: GroupType,
    pub privacy_level: PrivacyLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub federation_id: Option<String>,
}

impl From<&ChannelData> for ChannelContent {
    fn from(data: &ChannelData) -> Self {
        Self {
            name: data.name.clone(),
            about: data.about.clone(),
            picture: data.picture.clone(),
            group_type: data.group_type,
            privacy_level: data.privacy_level,
            federation_id: data.federation_id.clone(),
        }
    }
}

/// Type-specific channel settings.
///
/// Family channels read `guardian_oversight` and `spending_context`; peer
/// channels read `trust_level` and `relationship`. Unset values fall back to
/// `true`, `"family"`, `"standard"` and `"peer"` respectively.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelOptions {
    pub guardian_oversight: Option<bool>,
    pub spending_context: Option<String>,
    pub trust_level: Option<String>,
    pub relationship: Option<String>,
}

/// Fields a kind 41 update may change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMetadataUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMessageOptions {
    #[serde(default)]
    pub group_type: GroupType,
    #[serde(default)]
    pub priority: MessagePriority,
    /// Adds a `guardian-approval` tag.
    #[serde(default)]
    pub requires_approval: bool,
    /// Adds an `emergency` tag.
    #[serde(default)]
    pub emergency: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipAction {
    Add,
    Remove,
}

impl MembershipAction {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Add => Kind::GroupPutUser,
            Self::Remove => Kind::GroupRemoveUser,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    Guardian,
    #[default]
    Member,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Guardian => "guardian",
            Self::Member => "member",
        }
    }
}

fn require_hex32(field: &str, value: &str) -> Result<()> {
    if is_hex32(value) {
        Ok(())
    } else {
        Err(NostrkitError::invalid_input(field, "expected 64 hex characters"))
    }
}

/// Lowercase members and drop repeats, keeping first occurrences in order.
///
/// Hex keys compare case-insensitively, so `ab..` and `AB..` are one member.
pub fn dedup_members<S: AsRef<str>>(members: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    members
        .iter()
        .map(|m| m.as_ref().to_ascii_lowercase())
        .filter(|m| seen.insert(m.clone()))
        .collect()
}

/// Build a kind 40 channel creation event.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, fields(group_type = %channel_data.group_type))
)]
pub fn create_group_channel(
    channel_data: &ChannelData,
    sender_pubkey: &str,
    options: &ChannelOptions,
    clock: &dyn Clock,
) -> Result<ProtocolEvent> {
    if channel_data.name.trim().is_empty() {
        return Err(NostrkitError::invalid_input("name", "channel name is required"));
    }
    for admin in &channel_data.admins {
        require_hex32("admin", admin)?;
    }

    let content = serde_json::to_string(&ChannelContent::from(channel_data))?;

    let mut event_tags = vec![
        Tag::new([tags::GROUP_TYPE, channel_data.group_type.as_str()]),
        Tag::new([tags::PRIVACY_LEVEL, channel_data.privacy_level.as_str()]),
    ];
    event_tags.extend(
        channel_data
            .admins
            .iter()
            .map(|admin| Tag::new([tags::ADMIN, admin.as_str()])),
    );
    if let Some(federation) = &channel_data.federation_id {
        event_tags.push(Tag::new([tags::FEDERATION, federation.as_str()]));
    }

    match channel_data.group_type {
        GroupType::Family => {
            let oversight = options.guardian_oversight.unwrap_or(true);
            event_tags.push(Tag::new([
                tags::GUARDIAN_OVERSIGHT.to_string(),
                oversight.to_string(),
            ]));
            event_tags.push(Tag::new([
                tags::SPENDING_CONTEXT,
                options.spending_context.as_deref().unwrap_or("family"),
            ]));
        }
        GroupType::Peer => {
            event_tags.push(Tag::new([
                tags::TRUST_LEVEL,
                options.trust_level.as_deref().unwrap_or("standard"),
            ]));
            event_tags.push(Tag::new([
                tags::RELATIONSHIP,
                options.relationship.as_deref().unwrap_or("peer"),
            ]));
        }
    }

    build_event(Kind::ChannelCreation, content, sender_pubkey, event_tags, clock)
}

/// Build a kind 41 metadata update for an existing channel.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(channel = %channel_id)))]
pub fn update_channel_metadata(
    channel_id: &str,
    metadata: &ChannelMetadataUpdate,
    sender_pubkey: &str,
    clock: &dyn Clock,
) -> Result<ProtocolEvent> {
    require_hex32("channel_id", channel_id)?;
    let content = serde_json::to_string(metadata)?;
    build_event(
        Kind::ChannelMetadata,
        content,
        sender_pubkey,
        vec![Tag::root_event(channel_id)],
        clock,
    )
}

/// Build a kind 42 message addressed to every member of a channel.
///
/// Members are deduplicated; the first occurrence decides the order of the
/// `p` tags.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, fields(channel = %channel_id, members = members.len()))
)]
pub fn create_group_message<S: AsRef<str>>(
    content: &str,
    channel_id: &str,
    sender_pubkey: &str,
    members: &[S],
    options: &GroupMessageOptions,
    clock: &dyn Clock,
) -> Result<ProtocolEvent> {
    require_hex32("channel_id", channel_id)?;
    let members = dedup_members(members);
    for member in &members {
        require_hex32("member", member)?;
    }

    let mut event_tags = Vec::with_capacity(members.len() + 5);
    event_tags.push(Tag::root_event(channel_id));
    event_tags.extend(members.into_iter().map(Tag::pubkey));
    event_tags.push(Tag::new([tags::GROUP_TYPE, options.group_type.as_str()]));
    event_tags.push(Tag::new([tags::PRIORITY, options.priority.as_str()]));
    if options.requires_approval {
        event_tags.push(Tag::new([tags::GUARDIAN_APPROVAL, "true"]));
    }
    if options.emergency {
        event_tags.push(Tag::new([tags::EMERGENCY, "true"]));
    }

    build_event(Kind::ChannelMessage, content, sender_pubkey, event_tags, clock)
}

/// Build a kind 9000 (add) or 9001 (remove) membership request.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, fields(channel = %channel_id, action = ?action))
)]
pub fn create_group_membership(
    channel_id: &str,
    member_pubkey: &str,
    role: MemberRole,
    action: MembershipAction,
    admin_pubkey: &str,
    clock: &dyn Clock,
) -> Result<ProtocolEvent> {
    require_hex32("channel_id", channel_id)?;
    require_hex32("member", member_pubkey)?;

    let event_tags = vec![
        Tag::new([tags::GROUP, channel_id]),
        Tag::new([tags::PUBKEY, member_pubkey, role.as_str()]),
    ];
    build_event(action.kind(), "", admin_pubkey, event_tags, clock)
}

/// Emergency broadcast: highest priority, no guardian approval gate.
pub fn create_emergency_group_message<S: AsRef<str>>(
    content: &str,
    channel_id: &str,
    sender_pubkey: &str,
    members: &[S],
    clock: &dyn Clock,
) -> Result<ProtocolEvent> {
    let options = GroupMessageOptions {
        group_type: GroupType::Family,
        priority: MessagePriority::Emergency,
        requires_approval: false,
        emergency: true,
    };
    create_group_message(content, channel_id, sender_pubkey, members, &options, clock)
}

/// Channel id referenced by a group message's root `e` tag.
pub fn channel_of(message: &ProtocolEvent) -> Option<&str> {
    message
        .tags
        .iter()
        .filter(|tag| tag.is_named(tags::EVENT))
        .find(|tag| tag.get(3) == Some(tags::ROOT_MARKER))
        .or_else(|| message.tags.iter().find(|tag| tag.is_named(tags::EVENT)))
        .and_then(Tag::value)
}
