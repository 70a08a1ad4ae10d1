//! Node Directory Endpoints
//!
//! The canonical node projection: the read surface the chart widget and
//! profile duplication render from, plus the write surface Roster
//! Reconciliation and [`crate::db::RestStore`] drive.
//!
//! # Endpoints
//!
//! - `GET /api/directory?dept=` - list nodes, optionally one department
//! - `GET /api/directory/ids` - full id list, used for sync diffing
//! - `PUT /api/directory` - bulk upsert nodes
//! - `DELETE /api/directory` - bulk delete nodes by id
//! - `POST /api/departments` - register one department grouping node

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::http_error::ApiError;
use crate::api::{iso_timestamp, AppState};
use crate::models::{StoredNode, DEPARTMENT_TITLE, GROUP_TAG};

/// One directory row in rendering form: the column subset the widget
/// binds, without the audit (`orig_pid`) and free-text columns.
#[derive(Debug, Serialize)]
struct DirectoryRow {
    id: String,
    pid: Option<String>,
    stpid: Option<String>,
    name: String,
    title: String,
    image: Option<String>,
    tags: String,
    dept: Option<String>,
    bu: Option<String>,
    #[serde(rename = "type")]
    node_type: Option<String>,
    location: Option<String>,
    joining_date: Option<String>,
}

impl From<StoredNode> for DirectoryRow {
    fn from(node: StoredNode) -> Self {
        DirectoryRow {
            id: node.id,
            pid: node.pid,
            stpid: node.stpid,
            name: node.name,
            title: node.title,
            image: node.image,
            tags: node.tags,
            dept: node.dept,
            bu: node.bu,
            node_type: node.node_type,
            location: node.location,
            joining_date: node.joining_date,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DirectoryQuery {
    #[serde(default)]
    dept: Option<String>,
}

#[derive(Debug, Serialize)]
struct DirectoryResponse {
    data: Vec<DirectoryRow>,
    success: bool,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct IdList {
    ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct UpsertRequest {
    #[serde(default)]
    nodes: Vec<StoredNode>,
}

#[derive(Debug, Serialize)]
struct UpsertResponse {
    upserted: usize,
}

#[derive(Debug, Deserialize)]
struct DeleteRequest {
    #[serde(default)]
    ids: Vec<String>,
}

#[derive(Debug, Serialize)]
struct DeleteResponse {
    deleted: usize,
}

#[derive(Debug, Deserialize)]
struct AddDepartmentRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    pid: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct DepartmentCreated {
    success: bool,
    data: StoredNode,
    timestamp: String,
}

/// List directory nodes for rendering.
///
/// `dept` filters to one department; absent, blank, or `all` lists
/// everything except rows with a blank department (stragglers that never
/// belonged to a rendered tree).
async fn list_directory(
    State(state): State<AppState>,
    Query(params): Query<DirectoryQuery>,
) -> Result<Json<DirectoryResponse>, ApiError> {
    let dept_filter = params
        .dept
        .as_deref()
        .filter(|dept| !dept.is_empty() && *dept != "all");

    let nodes = state
        .store
        .list_nodes(dept_filter)
        .await
        .map_err(|err| ApiError::directory_failed(err.detail()))?;

    let data: Vec<DirectoryRow> = nodes
        .into_iter()
        .filter(|node| {
            dept_filter.is_some()
                || node
                    .dept
                    .as_deref()
                    .map_or(false, |dept| !dept.trim().is_empty())
        })
        .map(DirectoryRow::from)
        .collect();

    tracing::debug!(count = data.len(), dept = ?dept_filter, "Listed directory nodes");
    Ok(Json(DirectoryResponse {
        data,
        success: true,
        timestamp: iso_timestamp(),
    }))
}

/// Full id list of the canonical projection, for sync diffing. Unlike the
/// rendering list this includes rows with a blank department.
async fn directory_ids(State(state): State<AppState>) -> Result<Json<IdList>, ApiError> {
    let ids = state.store.node_ids().await?;
    Ok(Json(IdList { ids }))
}

/// Bulk upsert directory nodes by id.
async fn upsert_directory(
    State(state): State<AppState>,
    Json(request): Json<UpsertRequest>,
) -> Result<Json<UpsertResponse>, ApiError> {
    let upserted = state.store.upsert_nodes(request.nodes).await?;
    tracing::debug!(upserted, "Upserted directory nodes");
    Ok(Json(UpsertResponse { upserted }))
}

/// Bulk delete directory nodes by id. Unknown ids are ignored.
async fn delete_directory(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = state.store.delete_nodes(&request.ids).await?;
    tracing::debug!(deleted, "Deleted directory nodes");
    Ok(Json(DeleteResponse { deleted }))
}

/// Register one department grouping node.
///
/// The id defaults to the `dept:<name>:<pid>` key the roster projection
/// uses, so a manually added department and a synced one collide into the
/// same row instead of duplicating.
async fn add_department(
    State(state): State<AppState>,
    Json(request): Json<AddDepartmentRequest>,
) -> Result<Json<DepartmentCreated>, ApiError> {
    if request.name.is_empty() || request.pid.is_empty() {
        return Err(ApiError::with_failure(
            StatusCode::BAD_REQUEST,
            "Missing required fields: name and pid are required",
        ));
    }

    let department_id = request
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("dept:{}:{}", request.name, request.pid));

    let node = StoredNode {
        id: department_id,
        pid: Some(request.pid.clone()),
        stpid: None,
        name: request.name.clone(),
        title: DEPARTMENT_TITLE.to_string(),
        image: None,
        tags: json!([GROUP_TAG]).to_string(),
        orig_pid: Some(request.pid.clone()),
        dept: Some(request.name.clone()),
        bu: None,
        node_type: Some(GROUP_TAG.to_string()),
        location: None,
        description: request
            .description
            .clone()
            .filter(|description| !description.is_empty())
            .unwrap_or_else(|| format!("Department under manager {}", request.pid)),
        joining_date: None,
    };

    state
        .store
        .upsert_nodes(vec![node.clone()])
        .await
        .map_err(|err| {
            ApiError::with_failure(StatusCode::INTERNAL_SERVER_ERROR, err.detail())
        })?;

    tracing::info!(department_id = %node.id, "Added department node");
    Ok(Json(DepartmentCreated {
        success: true,
        data: node,
        timestamp: iso_timestamp(),
    }))
}

/// Create router with all directory endpoints
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/directory", get(list_directory))
        .route("/api/directory", put(upsert_directory))
        .route("/api/directory", delete(delete_directory))
        .route("/api/directory/ids", get(directory_ids))
        .route("/api/departments", post(add_department))
        .with_state(state)
}
