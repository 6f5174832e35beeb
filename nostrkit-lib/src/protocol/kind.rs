//! Event kinds understood by the envelope layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type of a [`ProtocolEvent`](super::ProtocolEvent).
///
/// Serializes as the bare integer used on the wire. Unknown integers survive a
/// round trip through [`Kind::Custom`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum Kind {
    /// Profile metadata (NIP-01).
    Metadata,
    /// Short text note (NIP-01).
    TextNote,
    /// Pairwise encrypted direct message (NIP-04).
    EncryptedDirectMessage,
    /// Inner sealed event carrying the real sender (NIP-59).
    Seal,
    /// Outer gift wrap authored by an ephemeral key (NIP-59).
    GiftWrap,
    /// Channel creation (NIP-28).
    ChannelCreation,
    /// Channel metadata update (NIP-28).
    ChannelMetadata,
    /// Message posted to a channel (NIP-28).
    ChannelMessage,
    /// Hide a channel message (NIP-28).
    ChannelHideMessage,
    /// Mute a channel user (NIP-28).
    ChannelMuteUser,
    /// Admin request adding a member to a group (NIP-29).
    GroupPutUser,
    /// Admin request removing a member from a group (NIP-29).
    GroupRemoveUser,
    /// Any kind without a dedicated variant.
    Custom(u16),
}

impl Kind {
    /// Wire value of this kind.
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Metadata => 0,
            Self::TextNote => 1,
            Self::EncryptedDirectMessage => 4,
            Self::Seal => 13,
            Self::ChannelCreation => 40,
            Self::ChannelMetadata => 41,
            Self::ChannelMessage => 42,
            Self::ChannelHideMessage => 43,
            Self::ChannelMuteUser => 44,
            Self::GiftWrap => 1059,
            Self::GroupPutUser => 9000,
            Self::GroupRemoveUser => 9001,
            Self::Custom(kind) => kind,
        }
    }

    /// True for kinds that only make sense inside an encrypted envelope.
    pub fn is_sealed(self) -> bool {
        matches!(self, Self::Seal)
    }

    /// True for NIP-28/29 group kinds.
    pub fn is_group(self) -> bool {
        matches!(
            self,
            Self::ChannelCreation
                | Self::ChannelMetadata
                | Self::ChannelMessage
                | Self::ChannelHideMessage
                | Self::ChannelMuteUser
                | Self::GroupPutUser
                | Self::GroupRemoveUser
        )
    }
}

impl From<u16> for Kind {
    fn from(kind: u16) -> Self {
        match kind {
            0 => Self::Metadata,
            1 => Self::TextNote,
            4 => Self::EncryptedDirectMessage,
            13 => Self::Seal,
            40 => Self::ChannelCreation,
            41 => Self::ChannelMetadata,
            42 => Self::ChannelMessage,
            43 => Self::ChannelHideMessage,
            44 => Self::ChannelMuteUser,
            1059 => Self::GiftWrap,
            9000 => Self::GroupPutUser,
            9001 => Self::GroupRemoveUser,
            other => Self::Custom(other),
        }
    }
}

impl From<Kind> for u16 {
    fn from(kind: Kind) -> Self {
        kind.as_u16()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_kinds_round_trip() {
        for value in [0u16, 1, 4, 13, 40, 41, 42, 43, 44, 1059, 9000, 9001] {
            let kind = Kind::from(value);
            assert!(!matches!(kind, Kind::Custom(_)), "{value} should be named");
            assert_eq!(kind.as_u16(), value);
        }
    }

    #[test]
    fn test_custom_kind_preserved() {
        let kind = Kind::from(30023);
        assert_eq!(kind, Kind::Custom(30023));
        assert_eq!(u16::from(kind), 30023);
    }

    #[test]
    fn test_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Kind::GiftWrap).unwrap(), "1059");
        let kind: Kind = serde_json::from_str("42").unwrap();
        assert_eq!(kind, Kind::ChannelMessage);
    }

    #[test]
    fn test_classification() {
        assert!(Kind::Seal.is_sealed());
        assert!(!Kind::GiftWrap.is_sealed());
        assert!(Kind::ChannelMessage.is_group());
        assert!(Kind::GroupPutUser.is_group());
        assert!(!Kind::TextNote.is_group());
    }
}
