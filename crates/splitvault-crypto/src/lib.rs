//! Authenticated encryption for Splitvault.
//! Every stored item is sealed with its own AES-256-GCM key that only the caller keeps.

pub mod engine;
pub mod error;
pub mod key;

pub use engine::{AeadEngine, AesGcmEngine};
pub use error::CryptoError;
pub use key::SymmetricKey;
