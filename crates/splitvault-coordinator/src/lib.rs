//! Encryption coordinator: seals caller plaintext with a fresh key, hands only the
//! ciphertext to the storage service, and returns the key to the caller.
//! Neither keys nor plaintext are kept once a request completes.

pub mod client;
pub mod error;
pub mod routes;
pub mod service;
pub mod transport;

pub use error::CoordinatorError;
pub use service::Coordinator;
pub use transport::{HttpBlobStore, StorageEndpoint};
