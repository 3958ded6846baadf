use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::{rngs::OsRng, RngCore};

use crate::{CryptoError, SymmetricKey};

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;
/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Key generation plus authenticated seal/open.
///
/// Blobs are `nonce || ciphertext || tag`.
pub trait AeadEngine: Send + Sync {
    fn generate_key(&self) -> Result<SymmetricKey, CryptoError>;

    fn encrypt(&self, plaintext: &[u8], key: &SymmetricKey) -> Result<Vec<u8>, CryptoError>;

    fn decrypt(&self, blob: &[u8], key: &SymmetricKey) -> Result<Vec<u8>, CryptoError>;
}

/// Stateless AES-256-GCM engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct AesGcmEngine;

impl AesGcmEngine {
    pub fn new() -> Self {
        Self
    }
}

impl AeadEngine for AesGcmEngine {
    fn generate_key(&self) -> Result<SymmetricKey, CryptoError> {
        SymmetricKey::generate()
    }

    fn encrypt(&self, plaintext: &[u8], key: &SymmetricKey) -> Result<Vec<u8>, CryptoError> {
        let cipher = build_cipher(key)?;

        // Fresh nonce per call even though keys are single-use.
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut nonce_bytes)
            .map_err(|e| CryptoError::Entropy(e.to_string()))?;

        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|e| CryptoError::Key(format!("encrypt failed: {e}")))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + sealed.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&sealed);
        Ok(blob)
    }

    fn decrypt(&self, blob: &[u8], key: &SymmetricKey) -> Result<Vec<u8>, CryptoError> {
        if blob.len() < NONCE_LEN {
            return Err(CryptoError::MalformedCiphertext { len: blob.len() });
        }

        let cipher = build_cipher(key)?;
        let (nonce, sealed) = blob.split_at(NONCE_LEN);
        cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CryptoError::AuthenticationFailure)
    }
}

fn build_cipher(key: &SymmetricKey) -> Result<Aes256Gcm, CryptoError> {
    Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|e| CryptoError::Key(e.to_string()))
}
