//! Nostrkit library.
//!
//! Privacy envelopes for Nostr messaging. The crate builds events and
//! ciphertexts; it never talks to relays and never signs. Publishing, retries
//! and signatures belong to the caller.
//!
//! # Layers
//!
//! - **Protocol**: canonical events with content-addressed ids ([`protocol`])
//! - **Envelopes**: pairwise encryption and seal/gift-wrap ([`envelope`])
//! - **Groups**: channel, message and membership events ([`group`])
//! - **Dispatch**: privacy-level selection and group fan-out ([`dispatcher`])
//!
//! # Example
//!
//! ```ignore
//! use nostrkit_lib::prelude::*;
//!
//! let dispatcher = MessageDispatcher::new(MessagingConfig::default());
//! let alice = Keys::generate();
//! let bob = Keys::generate();
//!
//! let sent = dispatcher
//!     .encrypt_message("hello", bob.public_key(), &alice, "giftwrapped", &MessageOptions::default())
//!     .await?;
//! let opened = dispatcher.decrypt_message(&sent, bob.secret_key(), None)?;
//! assert_eq!(opened.message, "hello");
//! ```

pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod envelope;
pub mod errors;
pub mod group;
pub mod keys;
pub mod prelude;
mod privacy;
pub mod protocol;

/// Test utilities: deterministic identities, fixed clocks and assertions.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::MessagingConfig;
pub use dispatcher::{
    DecryptedMessage, EncryptedMessage, EnvelopeMetadata, GroupDelivery, GroupMessageData,
    MessageDispatcher, MessageOptions,
};
pub use errors::{NostrkitError, NostrkitErrorCode};
pub use keys::{Keys, Secp256k1Signer, Signer};
pub use privacy::PrivacyLevel;
pub use protocol::{build_event, Kind, ProtocolEvent, Tag};

/// Common result alias for Nostrkit operations.
pub type Result<T> = std::result::Result<T, NostrkitError>;
