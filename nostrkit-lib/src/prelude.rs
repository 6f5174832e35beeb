//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use nostrkit_lib::prelude::*;
//! ```

// Events
pub use crate::protocol::{build_event, compute_event_id, Kind, ProtocolEvent, Tag};

// Error handling
pub use crate::errors::{NostrkitError, NostrkitErrorCode};
pub use crate::Result;

// Capabilities
pub use crate::clock::{Clock, SystemClock};
pub use crate::keys::{Keys, SecretKey, Secp256k1Signer, Signer};

// Envelopes
pub use crate::envelope::{pairwise, SealMetadata, WrapOptions, WrappedEnvelope};

// Groups
pub use crate::group::{
    ChannelData, ChannelOptions, GroupMessageOptions, GroupType, MemberRole, MembershipAction,
    MessagePriority,
};

// Dispatch
pub use crate::config::MessagingConfig;
pub use crate::dispatcher::{
    DecryptedMessage, EncryptedMessage, GroupDelivery, GroupMessageData, MessageDispatcher,
    MessageOptions, PrivacyLevel,
};
