use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use splitvault_core::api::{ApiResponse, IdKey, IdPayload};
use splitvault_crypto::{CryptoError, SymmetricKey};
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no record stored for id {id}")]
    NotFound { id: String },
    #[error("coordinator rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Protocol(String),
    #[error("coordinator returned an unusable key")]
    Key(#[from] CryptoError),
}

/// Typed client for the coordinator's caller-facing API.
pub struct CoordinatorClient {
    base_url: String,
    client: reqwest::Client,
}

impl CoordinatorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Store `payload` under `id`. The returned key is the only way back to it.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn store(&self, id: &str, payload: &str) -> Result<SymmetricKey, ClientError> {
        let request = IdPayload {
            id: id.to_string(),
            payload: payload.to_string(),
        };
        let url = format!("{}/store", self.base_url);
        let result: IdKey = self
            .send(id, self.client.post(url).json(&request))
            .await?;
        Ok(SymmetricKey::from_base64(&result.key)?)
    }

    #[instrument(skip_all, fields(id = %id))]
    pub async fn retrieve(&self, id: &str, key: &SymmetricKey) -> Result<String, ClientError> {
        let request = IdKey {
            id: id.to_string(),
            key: key.to_base64(),
        };
        let url = format!("{}/retrieve", self.base_url);
        let result: IdPayload = self
            .send(id, self.client.get(url).json(&request))
            .await?;
        Ok(result.payload)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        id: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| ClientError::Protocol(format!("http {status}: {e}")))?;

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound { id: id.to_string() });
        }
        if !body.is_success() {
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message: body.status_message,
            });
        }
        body.result
            .ok_or_else(|| ClientError::Protocol("success without a result".to_string()))
    }
}
