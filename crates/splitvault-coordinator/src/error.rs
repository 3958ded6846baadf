use splitvault_core::storage::StoreError;
use splitvault_crypto::CryptoError;
use thiserror::Error;

/// Failures of a coordinator store or retrieve.
///
/// Messages never include key bytes or plaintext.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoordinatorError {
    /// No randomness for a key or nonce. Never retried with a weaker source.
    #[error("entropy source failure")]
    Entropy(#[source] CryptoError),
    #[error("encryption failed")]
    Encryption(#[source] CryptoError),
    #[error("no record stored for id {id}")]
    NotFound { id: String },
    /// Caller-supplied key had the wrong length or encoding.
    #[error("invalid key")]
    InvalidKey(#[source] CryptoError),
    /// A record exists but this key does not open it, or the record is damaged.
    #[error("decryption failed")]
    Decryption(#[source] CryptoError),
    #[error("storage service call failed")]
    Upstream(#[source] StoreError),
}
