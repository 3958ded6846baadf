//! Core abstractions for Splitvault: the blob storage contract, the hashed-index
//! in-memory store, and the JSON envelope shared by both services.

pub mod api;
pub mod storage;
