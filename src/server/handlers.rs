//! HTTP handlers for the relay routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{debug, error, warn};

use super::AppState;
use crate::errors::BurnLinkError;
use crate::relay::wire::{
    CreateSecretRequest, CreateSecretResponse, ErrorBody, FetchSecretResponse, HealthResponse,
    ERROR_BURNED, ERROR_EXPIRED, ERROR_INTERNAL, ERROR_INVALID_REQUEST, ERROR_NOT_FOUND,
    ERROR_PAYLOAD_TOO_LARGE,
};

/// `POST /secrets`
pub async fn create_secret(
    State(state): State<AppState>,
    body: Result<Json<CreateSecretRequest>, JsonRejection>,
) -> Result<impl IntoResponse, BurnLinkError> {
    let Json(req) = body.map_err(rejection_to_error)?;
    let secret = req.into_new_secret().map_err(|e| {
        debug!(error = %e, "rejected create request");
        e
    })?;

    let id = state.store.create(secret)?;
    Ok((
        StatusCode::CREATED,
        Json(CreateSecretResponse { id: id.into() }),
    ))
}

/// `GET /secrets/:id`
pub async fn get_secret(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, BurnLinkError> {
    let snapshot = state.store.fetch(&id)?;
    Ok((
        [(header::CACHE_CONTROL, "no-store")],
        Json(FetchSecretResponse::from(snapshot)),
    ))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.store.stats();
    Json(HealthResponse {
        status: "ok".into(),
        secrets: stats.live,
        burned: stats.burned,
    })
}

/// Any route we do not serve.
pub async fn not_found() -> BurnLinkError {
    BurnLinkError::NotFound
}

fn rejection_to_error(rejection: JsonRejection) -> BurnLinkError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("request body over the size limit");
        BurnLinkError::PayloadTooLarge(rejection.body_text())
    } else {
        BurnLinkError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for BurnLinkError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            BurnLinkError::NotFound => (StatusCode::NOT_FOUND, ERROR_NOT_FOUND, None),
            BurnLinkError::Expired => (StatusCode::GONE, ERROR_EXPIRED, None),
            BurnLinkError::Burned => (StatusCode::GONE, ERROR_BURNED, None),
            BurnLinkError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, ERROR_INVALID_REQUEST, Some(msg.clone()))
            }
            BurnLinkError::PayloadTooLarge(_) => {
                (StatusCode::PAYLOAD_TOO_LARGE, ERROR_PAYLOAD_TOO_LARGE, None)
            }
            other => {
                error!(error = %other, "internal relay error");
                (StatusCode::INTERNAL_SERVER_ERROR, ERROR_INTERNAL, None)
            }
        };

        (
            status,
            Json(ErrorBody {
                error: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}
