use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use sha2::{Digest, Sha512};
use tracing::debug;

use super::{BlobStore, StoreError};

/// In-memory blob store indexed by a salted SHA-512 of the identifier.
///
/// The salt is plain configuration, so the hashing hides identifiers from casual
/// inspection only. One reader/writer lock guards the whole map: reads run
/// concurrently, a write excludes everything else. Nothing survives a restart.
#[derive(Debug, Default, Clone)]
pub struct HashedIndexStore {
    salt: String,
    inner: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl HashedIndexStore {
    pub fn new(salt: impl Into<String>) -> Self {
        Self {
            salt: salt.into(),
            inner: Arc::default(),
        }
    }

    /// Number of records currently held.
    pub fn len(&self) -> Result<usize, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn index_key(&self, id: &str) -> String {
        let mut hasher = Sha512::new();
        hasher.update(id.as_bytes());
        hasher.update(b"x");
        hasher.update(self.salt.as_bytes());
        URL_SAFE.encode(hasher.finalize())
    }
}

#[async_trait]
impl BlobStore for HashedIndexStore {
    async fn put(&self, id: &str, blob: &[u8]) -> Result<(), StoreError> {
        let index = self.index_key(id);

        let mut map = self.inner.write().map_err(poisoned)?;
        debug!(index = %index, bytes = blob.len(), "storing blob");
        // Last write wins.
        map.insert(index, blob.to_vec());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Vec<u8>, StoreError> {
        let index = self.index_key(id);

        let map = self.inner.read().map_err(poisoned)?;
        let blob = map.get(&index).cloned().ok_or_else(|| StoreError::NotFound {
            id: id.to_string(),
        })?;
        debug!(index = %index, bytes = blob.len(), "retrieved blob");
        Ok(blob)
    }
}

fn poisoned<E: std::fmt::Display>(err: E) -> StoreError {
    StoreError::Storage {
        reason: format!("lock poisoned: {err}"),
    }
}
