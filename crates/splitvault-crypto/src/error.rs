use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The OS random source could not produce bytes.
    #[error("entropy source failure: {0}")]
    Entropy(String),
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
    #[error("key is not valid base64: {0}")]
    KeyEncoding(String),
    /// The cipher refused the key material.
    #[error("cipher init failed: {0}")]
    Key(String),
    /// Blob is too short to even hold a nonce.
    #[error("malformed ciphertext: {len} bytes is shorter than the nonce")]
    MalformedCiphertext { len: usize },
    /// Tag check failed: wrong key, or the blob was corrupted or tampered with.
    #[error("message authentication failed")]
    AuthenticationFailure,
}
