//! # Signature Encryption
//!
//! The encrypted signature is the only payload the crate encrypts. The session
//! engine talks to a [`CryptoProvider`]; the cipher behind it is interchangeable.
//!
//! - [`ChaChaCrypto`]: ChaCha20-Poly1305 AEAD, output is `iv || ciphertext || tag`
//! - [`DisabledCrypto`]: fingerprinting off, envelopes carry no platform requests
//!
//! The IV is derived from the 32-bit elapsed session time plus a random salt drawn
//! when the cipher is created. The same instance encrypts the same signature at
//! the same session offset to the same bytes; two instances sharing a key never
//! collide on a nonce unless their salts do.

use crate::error::{constants, ProtocolError, Result};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};

/// ChaCha20-Poly1305 nonce length
pub const IV_LEN: usize = 12;

/// Encryption capability consumed by the signature assembler
pub trait CryptoProvider: Send + Sync {
    /// Whether signatures should be produced at all
    fn enabled(&self) -> bool;

    /// Derive the IV for a call made `elapsed_ms` after session start
    fn create_iv(&self, elapsed_ms: u32) -> Vec<u8>;

    fn encrypt(&self, plaintext: &[u8], iv: &[u8]) -> Result<Vec<u8>>;
}

/// ChaCha20-Poly1305 signature cipher.
///
/// Give each session its own instance. The IV depends only on the session offset
/// and this instance's salt, so one instance shared by two sessions can repeat a
/// nonce under the same key.
pub struct ChaChaCrypto {
    cipher: ChaCha20Poly1305,
    salt: [u8; 4],
}

impl ChaChaCrypto {
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(key)),
            salt: rand::random(),
        }
    }

    /// Fresh random key from the OS
    pub fn generate() -> Result<Self> {
        let mut key = [0u8; 32];
        getrandom::fill(&mut key)
            .map_err(|e| ProtocolError::Formatting(format!("key generation failed: {e}")))?;
        Ok(Self::new(&key))
    }

    /// Reverse of [`CryptoProvider::encrypt`]; used to inspect sealed signatures
    pub fn decrypt(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        if sealed.len() < IV_LEN {
            return Err(ProtocolError::Formatting(constants::ERR_INVALID_IV.into()));
        }
        let (iv, ciphertext) = sealed.split_at(IV_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(iv), ciphertext)
            .map_err(|_| ProtocolError::Formatting("decryption failed".into()))
    }
}

impl CryptoProvider for ChaChaCrypto {
    fn enabled(&self) -> bool {
        true
    }

    fn create_iv(&self, elapsed_ms: u32) -> Vec<u8> {
        let mut iv = vec![0u8; IV_LEN];
        iv[..4].copy_from_slice(&elapsed_ms.to_be_bytes());
        iv[4..8].copy_from_slice(&elapsed_ms.rotate_left(16).to_le_bytes());
        iv[8..].copy_from_slice(&self.salt);
        iv
    }

    fn encrypt(&self, plaintext: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
        if iv.len() != IV_LEN {
            return Err(ProtocolError::Formatting(constants::ERR_INVALID_IV.into()));
        }
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(iv), plaintext)
            .map_err(|_| ProtocolError::Formatting(constants::ERR_SIGNATURE_ENCRYPT.into()))?;

        let mut sealed = Vec::with_capacity(IV_LEN + ciphertext.len());
        sealed.extend_from_slice(iv);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }
}

/// Fingerprinting turned off
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCrypto;

impl CryptoProvider for DisabledCrypto {
    fn enabled(&self) -> bool {
        false
    }

    fn create_iv(&self, _elapsed_ms: u32) -> Vec<u8> {
        Vec::new()
    }

    fn encrypt(&self, plaintext: &[u8], _iv: &[u8]) -> Result<Vec<u8>> {
        Ok(plaintext.to_vec())
    }
}
