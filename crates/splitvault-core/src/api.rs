//! JSON envelope and payload shapes spoken by the coordinator and the storage service.

use serde::{Deserialize, Serialize};

/// `status_code` value carried by every successful response.
pub const STATUS_SUCCESS: u16 = 0;
/// `status_code` value the storage service uses for a missing record.
pub const STATUS_NOT_FOUND: u16 = 404;

/// Largest request body the coordinator accepts from callers.
pub const MAX_REQUEST_BYTES: usize = 2 * 1024 * 1024;

/// Largest request body the storage service accepts.
///
/// A caller payload of [`MAX_REQUEST_BYTES`] grows by the nonce and tag, then
/// by a third under base64, before it reaches storage.
pub const MAX_STORAGE_REQUEST_BYTES: usize = MAX_REQUEST_BYTES / 3 * 4 + 4096;

/// Response envelope shared by both services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub status_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(result: T) -> Self {
        Self {
            status_code: STATUS_SUCCESS,
            status_message: "Success".to_string(),
            result: Some(result),
            errors: Vec::new(),
        }
    }

    pub fn failure(status_code: u16, message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            status_code,
            status_message: message.into(),
            result: None,
            errors,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_SUCCESS
    }
}

/// Identifier plus payload. The payload is plaintext on the coordinator's
/// caller-facing API and base64 ciphertext on the storage API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdPayload {
    pub id: String,
    pub payload: String,
}

/// Identifier plus base64 key, as returned by a coordinator store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdKey {
    pub id: String,
    pub key: String,
}

/// Bare identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Id {
    pub id: String,
}
