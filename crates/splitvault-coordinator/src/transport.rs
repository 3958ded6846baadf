use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use splitvault_core::{
    api::{ApiResponse, Id, IdPayload, STATUS_NOT_FOUND, STATUS_SUCCESS},
    storage::{BlobStore, StoreError},
};
use tracing::{debug, instrument, warn};

/// Where and how to reach the storage service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEndpoint {
    /// Scheme, host and port, e.g. `http://localhost:8081`.
    pub base_url: String,
    pub store_path: String,
    pub retrieve_path: String,
    /// Deadline for each outbound call, body read included.
    pub timeout: Duration,
}

impl StorageEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            store_path: "/store".to_string(),
            retrieve_path: "/retrieve".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// `BlobStore` backed by the remote storage service's JSON API.
///
/// One HTTP call per operation, bounded by the endpoint timeout, never retried.
#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    endpoint: StorageEndpoint,
    client: reqwest::Client,
}

impl HttpBlobStore {
    pub fn new(endpoint: StorageEndpoint) -> Self {
        Self::with_client(endpoint, reqwest::Client::new())
    }

    /// Use a caller-built client (connection pool, proxies, test doubles).
    pub fn with_client(endpoint: StorageEndpoint, client: reqwest::Client) -> Self {
        Self { endpoint, client }
    }

    pub fn endpoint(&self) -> &StorageEndpoint {
        &self.endpoint
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>, StoreError> {
        let response = request
            .timeout(self.endpoint.timeout)
            .send()
            .await
            .map_err(transport_err)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_err)?;
        debug!(%status, bytes = body.len(), "storage service replied");

        serde_json::from_slice(&body).map_err(|e| StoreError::Upstream {
            reason: format!("failed to parse response body (http {status}): {e}"),
        })
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    #[instrument(skip_all, fields(bytes = blob.len()))]
    async fn put(&self, id: &str, blob: &[u8]) -> Result<(), StoreError> {
        let request = IdPayload {
            id: id.to_string(),
            payload: STANDARD.encode(blob),
        };
        let url = self.endpoint.url(&self.endpoint.store_path);
        let response: ApiResponse<Id> = self.send(self.client.post(url).json(&request)).await?;

        if !response.is_success() {
            return Err(unexpected(&response));
        }
        Ok(())
    }

    #[instrument(skip_all)]
    async fn get(&self, id: &str) -> Result<Vec<u8>, StoreError> {
        let request = Id { id: id.to_string() };
        let url = self.endpoint.url(&self.endpoint.retrieve_path);
        let response: ApiResponse<IdPayload> =
            self.send(self.client.get(url).json(&request)).await?;

        match response.status_code {
            STATUS_SUCCESS => {}
            STATUS_NOT_FOUND => return Err(StoreError::NotFound { id: id.to_string() }),
            _ => return Err(unexpected(&response)),
        }

        let result = response.result.ok_or_else(|| StoreError::Upstream {
            reason: "storage service returned success without a result".to_string(),
        })?;
        STANDARD
            .decode(result.payload)
            .map_err(|e| StoreError::Upstream {
                reason: format!("malformed ciphertext, failed to decode from base64: {e}"),
            })
    }
}

fn unexpected<T>(response: &ApiResponse<T>) -> StoreError {
    warn!(
        status_code = response.status_code,
        status_message = %response.status_message,
        "unexpected return from the storage service"
    );
    StoreError::Upstream {
        reason: format!(
            "unexpected return from the storage service: {} - {}, {}",
            response.status_code,
            response.status_message,
            response.errors.join(":")
        ),
    }
}

fn transport_err(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout
    } else {
        StoreError::Upstream {
            reason: err.to_string(),
        }
    }
}
