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
    api::{ApiResponse, IdKey, IdPayload, MAX_REQUEST_BYTES, STATUS_NOT_FOUND},
    storage::BlobStore,
};
use splitvault_crypto::AeadEngine;
use tracing::{error, info, warn};
use zeroize::Zeroizing;

use crate::{Coordinator, CoordinatorError};

/// Build the caller-facing router: `POST /store`, `GET /retrieve`, and a 400 for anything else.
pub fn router<E, S>(coordinator: Arc<Coordinator<E, S>>) -> Router
where
    E: AeadEngine + 'static,
    S: BlobStore + 'static,
{
    Router::new()
        .route(
            "/store",
            post(store_handler::<E, S>).fallback(unknown_request),
        )
        .route(
            "/retrieve",
            get(retrieve_handler::<E, S>).fallback(unknown_request),
        )
        .fallback(unknown_request)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .with_state(coordinator)
}

async fn store_handler<E, S>(
    State(coordinator): State<Arc<Coordinator<E, S>>>,
    body: Bytes,
) -> Result<Json<ApiResponse<IdKey>>, CoordinatorApiError>
where
    E: AeadEngine + 'static,
    S: BlobStore + 'static,
{
    let request: IdPayload = parse_body(&body)?;
    let key = coordinator
        .store(&request.id, request.payload.as_bytes())
        .await?;

    info!("store request completed");
    Ok(Json(ApiResponse::success(IdKey {
        id: request.id,
        key: key.to_base64(),
    })))
}

async fn retrieve_handler<E, S>(
    State(coordinator): State<Arc<Coordinator<E, S>>>,
    body: Bytes,
) -> Result<Json<ApiResponse<IdPayload>>, CoordinatorApiError>
where
    E: AeadEngine + 'static,
    S: BlobStore + 'static,
{
    let request: IdKey = parse_body(&body)?;
    let key = Zeroizing::new(STANDARD.decode(&request.key).map_err(|e| {
        CoordinatorApiError::BadRequest(format!("malformed key, failed to decode from base64: {e}"))
    })?);

    let plaintext = Zeroizing::new(coordinator.retrieve(&request.id, &key).await?);

    info!("retrieve request completed");
    Ok(Json(ApiResponse::success(IdPayload {
        id: request.id,
        payload: String::from_utf8_lossy(&plaintext).into_owned(),
    })))
}

async fn unknown_request() -> CoordinatorApiError {
    CoordinatorApiError::UnknownRequest
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, CoordinatorApiError> {
    serde_json::from_slice(body).map_err(|e| CoordinatorApiError::BadRequest(e.to_string()))
}

/// Failures the coordinator API reports. Callers get a status and a generic
/// message; the cause goes to the log.
#[derive(Debug)]
enum CoordinatorApiError {
    UnknownRequest,
    BadRequest(String),
    Coordinator(CoordinatorError),
}

impl From<CoordinatorError> for CoordinatorApiError {
    fn from(err: CoordinatorError) -> Self {
        CoordinatorApiError::Coordinator(err)
    }
}

impl IntoResponse for CoordinatorApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            CoordinatorApiError::UnknownRequest => (
                StatusCode::BAD_REQUEST,
                ApiResponse::<()>::failure(400, "unknown request", Vec::new()),
            ),
            CoordinatorApiError::BadRequest(reason) => {
                warn!(%reason, "failed to parse request data");
                bad_request()
            }
            CoordinatorApiError::Coordinator(CoordinatorError::InvalidKey(err)) => {
                warn!(error = %err, "rejected caller key");
                bad_request()
            }
            CoordinatorApiError::Coordinator(CoordinatorError::NotFound { id }) => {
                info!("no record for requested id");
                (
                    StatusCode::NOT_FOUND,
                    ApiResponse::failure(
                        STATUS_NOT_FOUND,
                        "Not Found",
                        vec![format!("text with id {id} not found")],
                    ),
                )
            }
            CoordinatorApiError::Coordinator(err) => {
                error!(error = %err, cause = ?std::error::Error::source(&err), "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::failure(500, "internal server error", Vec::new()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

fn bad_request() -> (StatusCode, ApiResponse<()>) {
    (
        StatusCode::BAD_REQUEST,
        ApiResponse::failure(400, "bad request", Vec::new()),
    )
}
