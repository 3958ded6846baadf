use splitvault_core::storage::{BlobStore, StoreError};
use splitvault_crypto::{AeadEngine, CryptoError, SymmetricKey};
use tracing::{debug, instrument};

use crate::CoordinatorError;

/// Orchestrates store and retrieve across the AEAD engine and the storage layer.
///
/// Holds no per-request state, so one instance serves any number of concurrent
/// requests. Each operation makes exactly one storage call and never retries.
pub struct Coordinator<E: AeadEngine, S: BlobStore> {
    engine: E,
    store: S,
}

impl<E: AeadEngine, S: BlobStore> Coordinator<E, S> {
    pub fn new(engine: E, store: S) -> Self {
        Self { engine, store }
    }

    /// Seal `plaintext` under a fresh key, hand the blob to storage, and return the key.
    ///
    /// The key leaves this function only if storage accepted the blob; on any
    /// failure it is dropped (and wiped) here.
    #[instrument(skip_all, fields(id = %id, bytes = plaintext.len()))]
    pub async fn store(&self, id: &str, plaintext: &[u8]) -> Result<SymmetricKey, CoordinatorError> {
        let key = self
            .engine
            .generate_key()
            .map_err(CoordinatorError::Entropy)?;

        let blob = self
            .engine
            .encrypt(plaintext, &key)
            .map_err(|err| match err {
                CryptoError::Entropy(_) => CoordinatorError::Entropy(err),
                other => CoordinatorError::Encryption(other),
            })?;

        self.store
            .put(id, &blob)
            .await
            .map_err(CoordinatorError::Upstream)?;

        debug!(sealed_bytes = blob.len(), "stored sealed payload");
        Ok(key)
    }

    /// Fetch the blob for `id` and open it with caller-supplied key bytes.
    ///
    /// The lookup happens before the key is validated: an unknown id is
    /// `NotFound` whatever key was sent.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn retrieve(&self, id: &str, key: &[u8]) -> Result<Vec<u8>, CoordinatorError> {
        let blob = self.store.get(id).await.map_err(|err| match err {
            StoreError::NotFound { .. } => CoordinatorError::NotFound { id: id.to_string() },
            other => CoordinatorError::Upstream(other),
        })?;

        let key = SymmetricKey::from_slice(key).map_err(CoordinatorError::InvalidKey)?;

        let plaintext = self
            .engine
            .decrypt(&blob, &key)
            .map_err(CoordinatorError::Decryption)?;

        debug!(bytes = plaintext.len(), "opened sealed payload");
        Ok(plaintext)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use async_trait::async_trait;
    use splitvault_core::storage::HashedIndexStore;
    use splitvault_crypto::AesGcmEngine;

    use super::*;

    fn coordinator() -> Coordinator<AesGcmEngine, HashedIndexStore> {
        Coordinator::new(AesGcmEngine::new(), HashedIndexStore::new("test-salt"))
    }

    #[tokio::test]
    async fn store_then_retrieve_round_trips() {
        let coordinator = coordinator();
        let key = coordinator.store("user1", b"hello").await.expect("store");

        let plaintext = coordinator
            .retrieve("user1", key.as_bytes())
            .await
            .expect("retrieve");
        assert_eq!(plaintext, b"hello");
    }

    #[tokio::test]
    async fn storage_never_sees_plaintext_or_key() {
        let store = HashedIndexStore::new("test-salt");
        let coordinator = Coordinator::new(AesGcmEngine::new(), store.clone());
        let key = coordinator
            .store("user1", b"attack at dawn")
            .await
            .expect("store");

        let blob = store.get("user1").await.expect("blob");
        assert!(!blob.windows(6).any(|w| w == b"attack"));
        assert!(!blob.windows(32).any(|w| w == key.as_bytes()));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found_regardless_of_key() {
        let coordinator = coordinator();
        let key = SymmetricKey::generate().unwrap();

        let candidates: [&[u8]; 3] = [key.as_bytes(), b"short", b""];
        for candidate in candidates {
            let err = coordinator
                .retrieve("does-not-exist", candidate)
                .await
                .expect_err("nothing stored");
            assert_eq!(
                err,
                CoordinatorError::NotFound {
                    id: "does-not-exist".into()
                }
            );
        }
    }

    #[tokio::test]
    async fn wrong_key_is_decryption_failure_not_not_found() {
        let coordinator = coordinator();
        coordinator.store("user1", b"hello").await.expect("store");
        let wrong = SymmetricKey::generate().unwrap();

        let err = coordinator
            .retrieve("user1", wrong.as_bytes())
            .await
            .expect_err("wrong key");
        assert_eq!(
            err,
            CoordinatorError::Decryption(CryptoError::AuthenticationFailure)
        );
    }

    #[tokio::test]
    async fn wrong_length_key_is_invalid_key() {
        let coordinator = coordinator();
        coordinator.store("user1", b"hello").await.expect("store");

        let err = coordinator
            .retrieve("user1", &[1u8; 31])
            .await
            .expect_err("short key");
        assert!(matches!(
            err,
            CoordinatorError::InvalidKey(CryptoError::InvalidKeyLength { actual: 31, .. })
        ));
    }

    #[tokio::test]
    async fn overwrite_orphans_the_old_key() {
        let coordinator = coordinator();
        let first = coordinator.store("user1", b"hello").await.expect("store");
        let second = coordinator.store("user1", b"world").await.expect("store");

        let err = coordinator
            .retrieve("user1", first.as_bytes())
            .await
            .expect_err("old key no longer opens the record");
        assert!(matches!(err, CoordinatorError::Decryption(_)));

        let plaintext = coordinator
            .retrieve("user1", second.as_bytes())
            .await
            .expect("retrieve");
        assert_eq!(plaintext, b"world");
    }

    #[tokio::test]
    async fn damaged_record_is_distinguishable() {
        let store = HashedIndexStore::new("test-salt");
        let coordinator = Coordinator::new(AesGcmEngine::new(), store.clone());
        let key = coordinator.store("user1", b"hello").await.expect("store");
        store.put("user1", b"tiny").await.expect("corrupt");

        let err = coordinator
            .retrieve("user1", key.as_bytes())
            .await
            .expect_err("damaged");
        assert_eq!(
            err,
            CoordinatorError::Decryption(CryptoError::MalformedCiphertext { len: 4 })
        );
    }

    /// Storage fake that rejects every write and counts attempts.
    #[derive(Default)]
    struct RejectingStore {
        puts: AtomicUsize,
    }

    #[async_trait]
    impl BlobStore for RejectingStore {
        async fn put(&self, _id: &str, _blob: &[u8]) -> Result<(), StoreError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Timeout)
        }

        async fn get(&self, id: &str) -> Result<Vec<u8>, StoreError> {
            Err(StoreError::NotFound { id: id.to_string() })
        }
    }

    #[tokio::test]
    async fn failed_forward_returns_no_key_and_does_not_retry() {
        let store = Arc::new(RejectingStore::default());
        let coordinator = Coordinator::new(AesGcmEngine::new(), Arc::clone(&store));

        let err = coordinator
            .store("user1", b"hello")
            .await
            .expect_err("forward fails");
        assert_eq!(err, CoordinatorError::Upstream(StoreError::Timeout));
        assert_eq!(store.puts.load(Ordering::SeqCst), 1);
    }

    struct NoEntropy;

    impl AeadEngine for NoEntropy {
        fn generate_key(&self) -> Result<SymmetricKey, CryptoError> {
            Err(CryptoError::Entropy("rng unavailable".into()))
        }

        fn encrypt(&self, _: &[u8], _: &SymmetricKey) -> Result<Vec<u8>, CryptoError> {
            unreachable!("no key, no encryption")
        }

        fn decrypt(&self, _: &[u8], _: &SymmetricKey) -> Result<Vec<u8>, CryptoError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn entropy_failure_is_fatal_and_stores_nothing() {
        let store = HashedIndexStore::new("");
        let coordinator = Coordinator::new(NoEntropy, store.clone());

        let err = coordinator
            .store("user1", b"hello")
            .await
            .expect_err("no entropy");
        assert!(matches!(err, CoordinatorError::Entropy(_)));
        assert!(store.is_empty().unwrap());
    }
}
