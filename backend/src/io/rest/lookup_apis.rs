//! # REST API for Lookup Entities
//!
//! Groups, categories, payers and payment modes share one set of routes,
//! selected by the `:kind` path segment (`groups`, `categories`, `payers`,
//! `payment-modes`).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use shared::{LookupKind, LookupListResponse, RenameLookupRequest};
use tracing::{error, info, warn};

use crate::domain::models::lookup::LookupTable;
use crate::error::LookupError;
use crate::AppState;

/// Create a router for lookup related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:kind", get(list_lookups))
        .route("/:kind/:id", put(rename_lookup).delete(delete_lookup))
}

fn unknown_kind(kind: &str) -> Response {
    warn!(kind, "Unknown lookup kind");
    (StatusCode::NOT_FOUND, format!("Unknown lookup kind '{}'", kind)).into_response()
}

fn lookup_error_response(err: LookupError) -> Response {
    let status = match &err {
        LookupError::InvalidName => StatusCode::BAD_REQUEST,
        LookupError::NotFound { .. } => StatusCode::NOT_FOUND,
        LookupError::NameTaken { .. } | LookupError::InUse { .. } => StatusCode::CONFLICT,
        LookupError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %err, "Lookup request failed");
        (status, "Lookup request failed").into_response()
    } else {
        warn!(error = %err, "Lookup request rejected");
        (status, err.to_string()).into_response()
    }
}

/// Axum handler function for GET /api/lookups/:kind
pub async fn list_lookups(State(state): State<AppState>, Path(kind): Path<String>) -> Response {
    info!("GET /api/lookups/{}", kind);

    let Some(lookup_kind) = LookupKind::from_slug(&kind) else {
        return unknown_kind(&kind);
    };

    match state.lookup_service.list(LookupTable::from(lookup_kind)).await {
        Ok(entities) => (
            StatusCode::OK,
            Json(LookupListResponse {
                kind: lookup_kind,
                entities,
            }),
        )
            .into_response(),
        Err(err) => lookup_error_response(err),
    }
}

/// Axum handler function for PUT /api/lookups/:kind/:id
pub async fn rename_lookup(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i64)>,
    Json(request): Json<RenameLookupRequest>,
) -> Response {
    info!("PUT /api/lookups/{}/{} - request: {:?}", kind, id, request);

    let Some(lookup_kind) = LookupKind::from_slug(&kind) else {
        return unknown_kind(&kind);
    };

    match state
        .lookup_service
        .rename(LookupTable::from(lookup_kind), id, &request.name)
        .await
    {
        Ok(entity) => (StatusCode::OK, Json(entity)).into_response(),
        Err(err) => lookup_error_response(err),
    }
}

/// Axum handler function for DELETE /api/lookups/:kind/:id
pub async fn delete_lookup(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i64)>,
) -> Response {
    info!("DELETE /api/lookups/{}/{}", kind, id);

    let Some(lookup_kind) = LookupKind::from_slug(&kind) else {
        return unknown_kind(&kind);
    };

    match state.lookup_service.delete(LookupTable::from(lookup_kind), id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => lookup_error_response(err),
    }
}
