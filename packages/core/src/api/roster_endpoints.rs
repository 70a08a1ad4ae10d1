//! Roster Endpoints
//!
//! Read-only view of the HR roster rows that feed Roster Reconciliation.
//! The roster itself is maintained upstream; this surface exists so
//! operators can inspect what a sync run will project.
//!
//! # Endpoints
//!
//! - `GET /api/employees?dept=` - list roster rows, optionally one department
//! - `GET /api/employees/:id` - fetch one roster row by employee id

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::http_error::ApiError;
use crate::api::AppState;
use crate::models::RosterRow;

#[derive(Debug, Deserialize)]
struct RosterQuery {
    #[serde(default)]
    dept: Option<String>,
}

#[derive(Debug, Serialize)]
struct RosterList {
    success: bool,
    data: Vec<RosterRow>,
}

#[derive(Debug, Serialize)]
struct RosterSingle {
    success: bool,
    data: RosterRow,
}

/// List roster rows, filtered to one department when `dept` is present.
async fn list_roster(
    State(state): State<AppState>,
    Query(params): Query<RosterQuery>,
) -> Result<Json<RosterList>, ApiError> {
    let result = match params.dept.as_deref().filter(|dept| !dept.is_empty()) {
        Some(dept) => state.store.dept_roster_rows(dept).await,
        None => state.store.list_roster_rows().await,
    };

    let data = result.map_err(|err| {
        ApiError::with_failure(StatusCode::INTERNAL_SERVER_ERROR, err.detail())
    })?;

    tracing::debug!(count = data.len(), "Listed roster rows");
    Ok(Json(RosterList {
        success: true,
        data,
    }))
}

/// Fetch one roster row by employee id.
async fn get_roster_row(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> Result<Json<RosterSingle>, ApiError> {
    let row = state
        .store
        .get_roster_row(&employee_id)
        .await
        .map_err(|err| {
            ApiError::with_failure(StatusCode::INTERNAL_SERVER_ERROR, err.detail())
        })?;

    match row {
        Some(data) => Ok(Json(RosterSingle {
            success: true,
            data,
        })),
        None => Err(ApiError::with_failure(
            StatusCode::NOT_FOUND,
            "Employee not found",
        )),
    }
}

/// Create router with all roster endpoints
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/employees", get(list_roster))
        .route("/api/employees/:id", get(get_roster_row))
        .with_state(state)
}
