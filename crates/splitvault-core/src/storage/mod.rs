mod hashed_index;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use hashed_index::HashedIndexStore;

/// Errors produced by blob store implementations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Nothing has been stored under this identifier.
    #[error("entry not found for id: {id}")]
    NotFound { id: String },
    /// Local storage failure.
    #[error("storage failure: {reason}")]
    Storage { reason: String },
    /// The remote storage service failed or answered with something unexpected.
    #[error("upstream storage failure: {reason}")]
    Upstream { reason: String },
    /// The remote storage call exceeded its deadline.
    #[error("upstream storage call timed out")]
    Timeout,
}

/// Contract for the storage layer: opaque ciphertext blobs keyed by caller identifiers.
///
/// Implementations never see plaintext or keys.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist a blob under an identifier, overwriting any existing entry.
    async fn put(&self, id: &str, blob: &[u8]) -> Result<(), StoreError>;

    /// Retrieve the most recently written blob for an identifier.
    async fn get(&self, id: &str) -> Result<Vec<u8>, StoreError>;
}

#[async_trait]
impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    async fn put(&self, id: &str, blob: &[u8]) -> Result<(), StoreError> {
        (**self).put(id, blob).await
    }

    async fn get(&self, id: &str) -> Result<Vec<u8>, StoreError> {
        (**self).get(id).await
    }
}
