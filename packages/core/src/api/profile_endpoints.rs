//! Chart Profile Endpoints
//!
//! Owner-scoped CRUD over saved chart profiles. These are the routes the
//! chart editor's load/save cycle and [`crate::db::RestStore`] speak.
//!
//! # Endpoints
//!
//! - `GET /api/orgcharts?username=` - list an owner's charts
//! - `POST /api/orgcharts` - create a chart
//! - `GET /api/orgcharts/:id` - fetch one chart
//! - `PUT /api/orgcharts/:id` - partial update (name, description, chart)
//! - `DELETE /api/orgcharts/:id` - delete, idempotent

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::http_error::ApiError;
use crate::api::AppState;
use crate::models::{ChartProfile, NewProfile, ProfileSummary, ProfileUpdate};

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    username: String,
}

#[derive(Debug, Serialize)]
struct ProfileList {
    orgcharts: Vec<ProfileSummary>,
}

#[derive(Debug, Serialize)]
struct CreatedResponse {
    success: bool,
    orgchart_id: String,
    message: String,
}

/// Success acknowledgement for updates and deletes.
#[derive(Debug, Serialize)]
struct AckResponse {
    success: bool,
    message: String,
}

/// List all charts owned by a user, newest first.
///
/// A missing or blank `username` yields an empty list rather than an
/// error; the login flow probes this before a user has picked a name.
async fn list_profiles(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ProfileList>, ApiError> {
    let orgcharts = state
        .profiles
        .list(&params.username)
        .await
        .map_err(|err| ApiError::list_failed(err.to_string()))?;
    Ok(Json(ProfileList { orgcharts }))
}

/// Create a chart profile.
///
/// Requires `username` and `orgchart_name`; description defaults to blank
/// and the chart document defaults to the empty node list.
async fn create_profile(
    State(state): State<AppState>,
    Json(profile): Json<NewProfile>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let created = state.profiles.create(profile).await?;
    Ok(Json(CreatedResponse {
        success: true,
        orgchart_id: created.orgchart_id,
        message: "Orgchart created successfully".to_string(),
    }))
}

/// Fetch one chart profile as its flat wire record.
///
/// The 404 body carries an empty chart document so the widget renders a
/// blank canvas while the caller refreshes its profile list.
async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ChartProfile>, ApiError> {
    match state.profiles.get(&id).await? {
        Some(profile) => Ok(Json(profile)),
        None => Err(ApiError::profile_not_found(&id)),
    }
}

/// Apply a partial update: any of name, description, and chart document.
///
/// An explicit `"org_data": null` resets the chart to the empty document;
/// a blank name is ignored rather than applied.
async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<AckResponse>, ApiError> {
    state.profiles.update(&id, update).await?;
    Ok(Json(AckResponse {
        success: true,
        message: "Updated successfully".to_string(),
    }))
}

/// Delete a chart profile. Deleting an id that is already gone still
/// succeeds.
async fn delete_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AckResponse>, ApiError> {
    state.profiles.delete(&id).await?;
    Ok(Json(AckResponse {
        success: true,
        message: "Deleted successfully".to_string(),
    }))
}

/// Create router with all profile endpoints
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/orgcharts", get(list_profiles))
        .route("/api/orgcharts", post(create_profile))
        .route("/api/orgcharts/:id", get(get_profile))
        .route("/api/orgcharts/:id", put(update_profile))
        .route("/api/orgcharts/:id", delete(delete_profile))
        .with_state(state)
}
