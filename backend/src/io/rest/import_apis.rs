//! # REST API for CSV Import
//!
//! The request body is the raw CSV text; the response is always the
//! import summary, even when every row failed.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use tracing::info;

use crate::AppState;

/// Create a router for import related APIs
pub fn router() -> Router<AppState> {
    Router::new().route("/import", post(import_expenses_csv))
}

/// Import expenses from a CSV upload
pub async fn import_expenses_csv(State(state): State<AppState>, body: String) -> impl IntoResponse {
    info!(bytes = body.len(), "POST /api/expenses/import");

    let summary = state.import_service.import_csv(&body).await;

    info!(
        total = summary.total_rows,
        successful = summary.successful_inserts,
        failed = summary.failed_inserts,
        "Import request completed"
    );
    (StatusCode::OK, Json(summary))
}
