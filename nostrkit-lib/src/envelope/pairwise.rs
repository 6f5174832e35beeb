//! Pairwise encryption between two identities (NIP-04 style).
//!
//! The symmetric key is the x-coordinate of the secp256k1 ECDH point shared by
//! the two parties, so either side can derive it from its own secret and the
//! counterpart's public key.
//!
//! # Wire Format
//!
//! ```text
//! base64( [16 bytes IV][N bytes AES-256-CBC ciphertext, PKCS#7 padded] )
//! ```

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use secp256k1::ecdh::shared_secret_point;
use zeroize::Zeroizing;

use crate::keys::{full_public_key, SecretKey};
use crate::{NostrkitError, Result};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Size of the CBC initialisation vector in bytes.
pub const IV_SIZE: usize = 16;

/// AES block size in bytes.
const BLOCK_SIZE: usize = 16;

/// Low-level cipher failures. Converted to
/// [`NostrkitError::CryptoOperation`] before leaving this module.
#[derive(Debug, thiserror::Error)]
enum CipherError {
    #[error("ciphertext is not valid base64")]
    Encoding,
    #[error("ciphertext too short or not block aligned")]
    InvalidLength,
    #[error("cipher initialisation failed")]
    KeyInit,
    #[error("decryption failed: bad key or corrupted ciphertext")]
    Padding,
    #[error("decrypted payload is not UTF-8")]
    Utf8,
}

impl From<CipherError> for NostrkitError {
    fn from(err: CipherError) -> Self {
        NostrkitError::CryptoOperation(err.to_string())
    }
}

/// Derive the 32-byte symmetric key shared with `counterpart_pubkey`.
pub fn shared_secret(
    counterpart_pubkey: &str,
    own_secret: &SecretKey,
) -> Result<Zeroizing<[u8; 32]>> {
    let point = Zeroizing::new(shared_secret_point(
        &full_public_key(counterpart_pubkey)?,
        own_secret,
    ));
    let mut key = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&point[..32]);
    Ok(key)
}

/// Encrypt `message` so that only `recipient_pubkey` (and the sender) can
/// read it.
///
/// A fresh random IV is drawn per call, so encrypting the same message twice
/// yields different ciphertexts.
pub fn encrypt(message: &str, recipient_pubkey: &str, sender_secret: &SecretKey) -> Result<String> {
    let key = shared_secret(recipient_pubkey, sender_secret)?;

    let mut iv = [0u8; IV_SIZE];
    rand::thread_rng().fill_bytes(&mut iv);

    let cipher = Aes256CbcEnc::new_from_slices(&key[..], &iv).map_err(|_| CipherError::KeyInit)?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(message.as_bytes());

    let mut payload = Vec::with_capacity(IV_SIZE + ciphertext.len());
    payload.extend_from_slice(&iv);
    payload.extend_from_slice(&ciphertext);

    Ok(STANDARD.encode(payload))
}

/// Decrypt a payload produced by [`encrypt`].
///
/// `counterpart_pubkey` is the other party: the sender when called by the
/// recipient, the recipient when the sender re-reads its own message.
pub fn decrypt(
    ciphertext_b64: &str,
    counterpart_pubkey: &str,
    own_secret: &SecretKey,
) -> Result<String> {
    let payload = STANDARD
        .decode(ciphertext_b64.trim())
        .map_err(|_| CipherError::Encoding)?;

    // IV plus at least one padded block
    if payload.len() < IV_SIZE + BLOCK_SIZE || (payload.len() - IV_SIZE) % BLOCK_SIZE != 0 {
        return Err(CipherError::InvalidLength.into());
    }
    let (iv, ciphertext) = payload.split_at(IV_SIZE);

    let key = shared_secret(counterpart_pubkey, own_secret)?;
    let cipher = Aes256CbcDec::new_from_slices(&key[..], iv).map_err(|_| CipherError::KeyInit)?;
    let plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CipherError::Padding)?;

    String::from_utf8(plaintext).map_err(|_| CipherError::Utf8.into())
}

/// Heuristic: does `content` have the shape of a pairwise payload?
///
/// Only checks encoding and length; it cannot tell whether decryption would
/// succeed.
pub fn looks_like_ciphertext(content: &str) -> bool {
    match STANDARD.decode(content.trim()) {
        Ok(bytes) => bytes.len() >= IV_SIZE + BLOCK_SIZE && (bytes.len() - IV_SIZE) % BLOCK_SIZE == 0,
        Err(_) => false,
    }
}
