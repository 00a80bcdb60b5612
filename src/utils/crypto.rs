//! AES-256-GCM message sealing.
//!
//! Confidentiality and integrity for one message at a time under a
//! pre-shared 32-byte key. Every seal draws a fresh random 96-bit nonce from
//! the OS; the 128-bit tag is produced detached so the framing layer can
//! place it independently of the ciphertext.
//!
//! ## Security
//! - Nonces come from the OS RNG and are never reused by construction
//! - Tag verification happens before any plaintext leaves this module
//! - Key material is zeroized on drop and redacted from Debug output

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce, Tag};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{ChannelError, Result};

/// Pre-shared key length in bytes.
pub const KEY_LEN: usize = 32;

/// Nonce length in bytes (96-bit GCM nonce).
pub const NONCE_LEN: usize = 12;

/// Authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// The pre-shared symmetric key for one channel.
///
/// Provisioned externally before any channel exists and immutable for the
/// channel's lifetime. The raw bytes are zeroized when the key is dropped
/// and never appear in logs or serialized output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_LEN]);

impl SymmetricKey {
    /// Wraps raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parses a 64-character hex string.
    pub fn from_hex(encoded: &str) -> Result<Self> {
        let decoded = hex::decode(encoded.trim())
            .map_err(|e| ChannelError::Config(format!("invalid key hex: {e}")))?;
        let bytes: [u8; KEY_LEN] = decoded.try_into().map_err(|v: Vec<u8>| {
            ChannelError::Config(format!("key must be {KEY_LEN} bytes, got {}", v.len()))
        })?;
        Ok(Self(bytes))
    }

    /// Reads a hex-encoded key from an environment variable.
    pub fn from_env(var: &str) -> Result<Self> {
        let encoded = std::env::var(var)
            .map_err(|e| ChannelError::Config(format!("key variable {var}: {e}")))?;
        Self::from_hex(&encoded)
    }

    /// Generates a random key from the OS RNG.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; KEY_LEN];
        getrandom::fill(&mut bytes).map_err(|_| ChannelError::Encryption)?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}

/// One sealed message: the nonce it was sealed under, the detached tag, and
/// the ciphertext (same length as the plaintext).
pub struct SealedMessage {
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

/// AES-256-GCM cipher bound to one key.
pub struct MessageCipher {
    cipher: Aes256Gcm,
}

impl MessageCipher {
    pub fn new(key: &SymmetricKey) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key.as_bytes());
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Draws a fresh random nonce from the OS RNG.
    ///
    /// Nonce generation is the cipher's responsibility; callers never supply
    /// their own.
    pub fn generate_nonce() -> Result<[u8; NONCE_LEN]> {
        let mut nonce = [0u8; NONCE_LEN];
        getrandom::fill(&mut nonce).map_err(|_| ChannelError::Encryption)?;
        Ok(nonce)
    }

    /// Encrypts and tags `plaintext` under a fresh nonce.
    pub fn seal(&self, plaintext: &[u8]) -> Result<SealedMessage> {
        let nonce = Self::generate_nonce()?;
        let mut buffer = plaintext.to_vec();
        let tag = self
            .cipher
            .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut buffer)
            .map_err(|_| ChannelError::Encryption)?;

        Ok(SealedMessage {
            nonce,
            tag: tag.into(),
            ciphertext: buffer,
        })
    }

    /// Verifies the tag and decrypts.
    ///
    /// On tag mismatch the working buffer is zeroized and discarded;
    /// unverified plaintext is never observable to callers.
    pub fn open(
        &self,
        nonce: &[u8; NONCE_LEN],
        tag: &[u8; TAG_LEN],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>> {
        let mut buffer = ciphertext.to_vec();
        match self.cipher.decrypt_in_place_detached(
            Nonce::from_slice(nonce),
            b"",
            &mut buffer,
            Tag::from_slice(tag),
        ) {
            Ok(()) => Ok(buffer),
            Err(_) => {
                buffer.zeroize();
                Err(ChannelError::Authentication)
            }
        }
    }
}
