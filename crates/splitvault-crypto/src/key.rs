use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::CryptoError;

/// Length of a [`SymmetricKey`] in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Single-use 256-bit AES key.
///
/// Only obtainable from [`SymmetricKey::generate`] or by parsing caller input,
/// so a value of this type always has the right length. Bytes are wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_LEN]);

impl SymmetricKey {
    /// Draw a fresh key from the OS CSPRNG. There is no fallback source.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut bytes = [0u8; KEY_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::Entropy(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != KEY_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_LEN,
                actual: bytes.len(),
            });
        }

        let mut out = [0u8; KEY_LEN];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let mut bytes = STANDARD
            .decode(encoded)
            .map_err(|e| CryptoError::KeyEncoding(e.to_string()))?;
        let key = Self::from_slice(&bytes);
        bytes.zeroize();
        key
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

// Never log key bytes.
impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_differ() {
        let first = SymmetricKey::generate().unwrap();
        let second = SymmetricKey::generate().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn base64_round_trip() {
        let key = SymmetricKey::generate().unwrap();
        let encoded = key.to_base64();
        assert_eq!(encoded.len(), 44);
        assert_eq!(SymmetricKey::from_base64(&encoded).unwrap(), key);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = SymmetricKey::from_slice(&[7u8; 16]).expect_err("should reject short key");
        assert_eq!(
            err,
            CryptoError::InvalidKeyLength {
                expected: 32,
                actual: 16
            }
        );

        let err = SymmetricKey::from_base64("abcd").expect_err("should reject wrong length");
        assert!(matches!(err, CryptoError::InvalidKeyLength { actual: 3, .. }));
    }

    #[test]
    fn rejects_non_base64() {
        let err = SymmetricKey::from_base64("not base64!").expect_err("should reject");
        assert!(matches!(err, CryptoError::KeyEncoding(_)));
    }

    #[test]
    fn debug_output_is_redacted() {
        let key = SymmetricKey::from_slice(&[0xAB; KEY_LEN]).unwrap();
        let rendered = format!("{key:?}");
        assert_eq!(rendered, "SymmetricKey(<redacted>)");
        assert!(!rendered.contains(&key.to_base64()));
    }
}
