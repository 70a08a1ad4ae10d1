//! Roster Reconciliation Endpoints
//!
//! Trigger points for [`crate::services::RosterSync`]. A body naming an
//! employee runs a single-employee pass; anything else (including no body
//! at all) runs the full reconciliation.
//!
//! Sync failures report as HTTP 200 with `{"success": false, "error": ..}`
//! so upstream schedulers read the outcome from the payload rather than
//! retrying on status alone.
//!
//! # Endpoints
//!
//! - `POST /api/sync` - single-employee sync when `employeeId` is present,
//!   otherwise full
//! - `GET /api/sync` - full sync

use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::AppState;
use crate::services::{SyncError, SyncReport};

#[derive(Debug, Default, Deserialize)]
struct SyncRequest {
    #[serde(default, rename = "employeeId")]
    employee_id: Option<String>,
}

fn sync_response(result: Result<SyncReport, SyncError>) -> Response {
    match result {
        Ok(report) => Json(report).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Sync run failed");
            Json(json!({ "success": false, "error": err.to_string() })).into_response()
        }
    }
}

/// Run a sync pass. A parseable body with a non-blank `employeeId` scopes
/// the pass to that employee; everything else falls through to full sync.
async fn trigger_sync(
    State(state): State<AppState>,
    body: Option<Json<SyncRequest>>,
) -> Response {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let result = match request.employee_id.as_deref().filter(|id| !id.is_empty()) {
        Some(employee_id) => state.sync.sync_single(employee_id).await,
        None => state.sync.sync_full().await,
    };
    sync_response(result)
}

/// Run a full sync pass.
async fn full_sync(State(state): State<AppState>) -> Response {
    sync_response(state.sync.sync_full().await)
}

/// Create router with all sync endpoints
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/sync", post(trigger_sync))
        .route("/api/sync", get(full_sync))
        .with_state(state)
}
