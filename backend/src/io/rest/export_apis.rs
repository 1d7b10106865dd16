//! # REST API for Data Export
//!
//! Endpoint for downloading expenses as a CSV file.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::domain::models::expense::ExpenseFilter;
use crate::error::ExportError;
use crate::AppState;

/// Query parameters for the export endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Comma-separated expense group ids
    pub expense_group_ids: Option<String>,
}

impl ExportQuery {
    /// Convert the raw parameters into a filter, rejecting malformed values
    pub fn to_filter(&self) -> Result<ExpenseFilter, String> {
        Ok(ExpenseFilter {
            start_date: parse_date_param("startDate", self.start_date.as_deref())?,
            end_date: parse_date_param("endDate", self.end_date.as_deref())?,
            group_ids: parse_group_ids(self.expense_group_ids.as_deref())?,
        })
    }
}

fn parse_date_param(name: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("{} must be YYYY-MM-DD, got '{}'", name, value)),
    }
}

fn parse_group_ids(raw: Option<&str>) -> Result<Option<Vec<i64>>, String> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|_| format!("expenseGroupIds contains a non-integer '{}'", part))
        })
        .collect::<Result<Vec<i64>, String>>()?;

    Ok(if ids.is_empty() { None } else { Some(ids) })
}

/// Create a router for export related APIs
pub fn router() -> Router<AppState> {
    Router::new().route("/export", get(export_expenses_csv))
}

/// Export expenses as a CSV download
pub async fn export_expenses_csv(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Response {
    info!("GET /api/expenses/export - query: {:?}", query);

    let filter = match query.to_filter() {
        Ok(filter) => filter,
        Err(message) => {
            warn!(%message, "Rejecting export request");
            return (StatusCode::BAD_REQUEST, message).into_response();
        }
    };

    match state.export_service.export_csv(filter).await {
        Ok(export) => {
            let disposition = format!("attachment; filename=\"{}\"", export.filename);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                export.content,
            )
                .into_response()
        }
        Err(err @ ExportError::InvalidRange { .. }) => {
            warn!(error = %err, "Rejecting export request");
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        Err(err) => {
            error!(error = %err, "Failed to export expenses");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to export expenses").into_response()
        }
    }
}
