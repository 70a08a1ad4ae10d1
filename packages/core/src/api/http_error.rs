//! HTTP error responses for the chart API
//!
//! The API's error bodies predate any unified envelope: profile routes
//! answer `{ "error": ... }`, directory and roster routes answer
//! `{ "success": false, "error": ... }`, and a missing chart carries an
//! empty document so the widget can render a blank canvas without a
//! special case. [`ApiError`] pins each body shape to its status so
//! handlers stay declarative.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::db::StorageError;
use crate::services::ProfileError;

/// One API error response: a status and the exact JSON body to send.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    /// Plain `{ "error": ... }` body.
    pub fn with_error(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    /// Flagged `{ "success": false, "error": ... }` body.
    pub fn with_failure(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            body: json!({ "success": false, "error": message.into() }),
        }
    }

    /// 404 for a missing chart profile. Carries an empty chart document so
    /// the widget renders a blank canvas instead of crashing on undefined.
    pub fn profile_not_found(orgchart_id: &str) -> Self {
        ApiError {
            status: StatusCode::NOT_FOUND,
            body: json!({
                "error": "Orgchart not found",
                "orgchart_id": orgchart_id,
                "org_data": { "data": [] }
            }),
        }
    }

    /// 500 for the profile listing; the body keeps the `orgcharts` key so
    /// clients that skip status checks still iterate an empty list.
    pub fn list_failed(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: json!({ "orgcharts": [], "error": message.into() }),
        }
    }

    /// 500 for the directory listing, with the same empty-`data` guarantee.
    pub fn directory_failed(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: json!({ "data": [], "success": false, "error": message.into() }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ProfileNotFound { orgchart_id } => {
                ApiError::profile_not_found(&orgchart_id)
            }
            other => ApiError::with_error(StatusCode::INTERNAL_SERVER_ERROR, other.detail()),
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::MissingFields => {
                ApiError::with_error(StatusCode::BAD_REQUEST, err.to_string())
            }
            ProfileError::EmptyDepartment { .. } => {
                ApiError::with_error(StatusCode::BAD_REQUEST, err.to_string())
            }
            ProfileError::Storage(inner) => ApiError::from(inner),
        }
    }
}
