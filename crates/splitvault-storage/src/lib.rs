//! Storage service: the HTTP face of the hashed-index store.
//! It only ever receives identifiers and base64 ciphertext, never plaintext or keys.

pub mod routes;

pub use routes::{router, router_at};
