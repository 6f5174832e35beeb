//! Deterministic fixtures.

use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::clock::FixedClock;
use crate::config::MessagingConfig;
use crate::dispatcher::MessageDispatcher;
use crate::keys::{Keys, Secp256k1Signer};

/// 2023-11-14T22:13:20Z
pub const TEST_NOW: u64 = 1_700_000_000;

/// Identity derived from `sha256(seed)`.
///
/// The same seed always yields the same keys.
pub fn test_keys(seed: &str) -> Keys {
    let digest = Sha256::digest(seed.as_bytes());
    Keys::from_secret_hex(&hex::encode(digest)).expect("sha256 output is a valid secret key")
}

/// Three fixed identities for multi-party scenarios.
#[derive(Clone, Debug)]
pub struct TestIdentities {
    pub alice: Keys,
    pub bob: Keys,
    pub carol: Keys,
}

impl TestIdentities {
    pub fn new() -> Self {
        Self {
            alice: test_keys("alice"),
            bob: test_keys("bob"),
            carol: test_keys("carol"),
        }
    }

    /// Public keys of bob and carol, the usual group recipients.
    pub fn members(&self) -> Vec<String> {
        vec![
            self.bob.public_key().to_string(),
            self.carol.public_key().to_string(),
        ]
    }
}

impl Default for TestIdentities {
    fn default() -> Self {
        Self::new()
    }
}

/// Dispatcher with default config and the clock frozen at [`TEST_NOW`].
pub fn test_dispatcher() -> MessageDispatcher {
    test_dispatcher_with(MessagingConfig::default())
}

pub fn test_dispatcher_with(config: MessagingConfig) -> MessageDispatcher {
    MessageDispatcher::with_capabilities(
        Arc::new(Secp256k1Signer),
        Arc::new(FixedClock(TEST_NOW)),
        config,
    )
}

/// A well-formed channel id for group tests.
pub fn sample_channel_id() -> String {
    hex::encode(Sha256::digest(b"sample channel"))
}
