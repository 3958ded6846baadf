use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use splitvault_core::{
    api::{ApiResponse, Id, IdPayload, MAX_STORAGE_REQUEST_BYTES, STATUS_NOT_FOUND},
    storage::{BlobStore, StoreError},
};
use tracing::{info, warn};

#[derive(Clone)]
struct StorageState {
    store: Arc<dyn BlobStore>,
}

/// Build the storage router: `POST /store`, `GET /retrieve`, and a 400 for anything else.
pub fn router(store: Arc<dyn BlobStore>) -> Router {
    router_at(store, "/store", "/retrieve")
}

/// Same as [`router`], mounted on caller-chosen paths. The two paths must differ.
pub fn router_at(store: Arc<dyn BlobStore>, store_path: &str, retrieve_path: &str) -> Router {
    Router::new()
        .route(store_path, post(store_handler).fallback(unknown_request))
        .route(retrieve_path, get(retrieve_handler).fallback(unknown_request))
        .fallback(unknown_request)
        .layer(DefaultBodyLimit::max(MAX_STORAGE_REQUEST_BYTES))
        .with_state(StorageState { store })
}

async fn store_handler(
    State(state): State<StorageState>,
    body: Bytes,
) -> Result<Json<ApiResponse<Id>>, StorageApiError> {
    let request: IdPayload = parse_body(&body)?;
    let blob = STANDARD
        .decode(&request.payload)
        .map_err(|e| StorageApiError::BadRequest(format!("payload is not base64: {e}")))?;

    state.store.put(&request.id, &blob).await?;
    info!(bytes = blob.len(), "stored blob");

    Ok(Json(ApiResponse::success(Id { id: request.id })))
}

async fn retrieve_handler(
    State(state): State<StorageState>,
    body: Bytes,
) -> Result<Json<ApiResponse<IdPayload>>, StorageApiError> {
    let request: Id = parse_body(&body)?;
    let blob = state.store.get(&request.id).await?;

    Ok(Json(ApiResponse::success(IdPayload {
        id: request.id,
        payload: STANDARD.encode(blob),
    })))
}

async fn unknown_request() -> StorageApiError {
    StorageApiError::UnknownRequest
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, StorageApiError> {
    serde_json::from_slice(body).map_err(|e| StorageApiError::BadRequest(e.to_string()))
}

/// Failures the storage API reports; causes are logged, never echoed back.
#[derive(Debug)]
enum StorageApiError {
    UnknownRequest,
    BadRequest(String),
    Store(StoreError),
}

impl From<StoreError> for StorageApiError {
    fn from(err: StoreError) -> Self {
        StorageApiError::Store(err)
    }
}

impl IntoResponse for StorageApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            StorageApiError::UnknownRequest => (
                StatusCode::BAD_REQUEST,
                ApiResponse::<()>::failure(400, "unknown request", Vec::new()),
            ),
            StorageApiError::BadRequest(reason) => {
                warn!(%reason, "failed to parse request data");
                (
                    StatusCode::BAD_REQUEST,
                    ApiResponse::failure(400, "bad request", Vec::new()),
                )
            }
            StorageApiError::Store(StoreError::NotFound { id }) => {
                info!("no blob stored for requested id");
                (
                    StatusCode::NOT_FOUND,
                    ApiResponse::failure(
                        STATUS_NOT_FOUND,
                        "Not Found",
                        vec![format!("text with id {id} not found")],
                    ),
                )
            }
            StorageApiError::Store(err) => {
                tracing::error!(error = %err, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::failure(500, "internal server error", Vec::new()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
