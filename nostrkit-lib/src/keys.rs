//! secp256k1 identities and the signer capability.
//!
//! Public keys travel as 64-character hex strings of the x-only key, the same
//! shape Nostr uses on the wire. Secret keys stay typed as
//! [`secp256k1::SecretKey`] so they cannot be confused with public material.

use async_trait::async_trait;
use secp256k1::{Keypair, Parity, PublicKey, Secp256k1, XOnlyPublicKey};
use std::fmt;

pub use secp256k1::SecretKey;

use crate::{NostrkitError, Result};

/// A secret key together with its x-only public key.
#[derive(Clone)]
pub struct Keys {
    secret: SecretKey,
    public_key: String,
}

impl Keys {
    /// Generate a fresh random identity.
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let keypair = Keypair::new(&secp, &mut rand::thread_rng());
        Self::from_keypair(&keypair)
    }

    pub fn from_secret_key(secret: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let keypair = Keypair::from_secret_key(&secp, &secret);
        Self::from_keypair(&keypair)
    }

    /// Parse a 64-character hex secret.
    pub fn from_secret_hex(secret_hex: &str) -> Result<Self> {
        Ok(Self::from_secret_key(parse_secret_key(secret_hex)?))
    }

    fn from_keypair(keypair: &Keypair) -> Self {
        let (xonly, _) = keypair.x_only_public_key();
        Self {
            secret: keypair.secret_key(),
            public_key: hex::encode(xonly.serialize()),
        }
    }

    /// Hex x-only public key.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    /// Hex encoding of the secret, for callers that persist identities.
    pub fn secret_hex(&self) -> String {
        hex::encode(self.secret.secret_bytes())
    }
}

impl fmt::Debug for Keys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keys")
            .field("public_key", &self.public_key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl PartialEq for Keys {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
    }
}

impl Eq for Keys {}

/// Parse a hex secret key.
///
/// Errors name the field but never echo the input.
pub fn parse_secret_key(secret_hex: &str) -> Result<SecretKey> {
    let bytes = hex::decode(secret_hex.trim())
        .map_err(|_| NostrkitError::invalid_input("secret_key", "expected hex"))?;
    SecretKey::from_slice(&bytes)
        .map_err(|_| NostrkitError::invalid_input("secret_key", "not a valid secp256k1 scalar"))
}

/// Parse a hex x-only public key.
pub fn parse_public_key(pubkey_hex: &str) -> Result<XOnlyPublicKey> {
    let bytes = hex::decode(pubkey_hex)
        .map_err(|_| NostrkitError::invalid_input("pubkey", "expected 64 hex characters"))?;
    XOnlyPublicKey::from_slice(&bytes)
        .map_err(|_| NostrkitError::invalid_input("pubkey", "not a point on secp256k1"))
}

/// Lift an x-only key to a full point. Nostr keys are always even-parity.
pub(crate) fn full_public_key(pubkey_hex: &str) -> Result<PublicKey> {
    Ok(parse_public_key(pubkey_hex)?.public_key(Parity::Even))
}

/// Hex x-only public key for `secret`.
pub fn derive_public_key(secret: &SecretKey) -> String {
    let secp = Secp256k1::new();
    let (xonly, _) = secret.x_only_public_key(&secp);
    hex::encode(xonly.serialize())
}

/// Key capability the envelope layer depends on.
///
/// Swappable so that hardware signers or remote bunkers can provide
/// ephemeral identities.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Public key belonging to `secret`.
    fn public_key(&self, secret: &SecretKey) -> Result<String>;

    /// Fresh single-use identity unrelated to any other key.
    async fn generate_ephemeral(&self) -> Result<Keys>;
}

/// In-process signer backed by the `secp256k1` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct Secp256k1Signer;

#[async_trait]
impl Signer for Secp256k1Signer {
    fn public_key(&self, secret: &SecretKey) -> Result<String> {
        Ok(derive_public_key(secret))
    }

    async fn generate_ephemeral(&self) -> Result<Keys> {
        Ok(Keys::generate())
    }
}
