//! Storage Error Types
//!
//! This module defines error types for the chart-profile and roster storage
//! boundary. Failures carry the clearest message available: the server's
//! parsed `error` field when the body is JSON, otherwise a truncated raw
//! snippet. Profile-not-found is a distinguished condition so callers can
//! recover (clear selection, refresh the list) instead of alarming the user.

use serde_json::Value;
use thiserror::Error;

/// Maximum raw-body length quoted in error details
pub const ERROR_SNIPPET_LEN: usize = 100;

/// Errors from chart-profile and roster storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// The addressed chart profile does not exist
    #[error("orgchart profile not found: {orgchart_id}")]
    ProfileNotFound { orgchart_id: String },

    /// The store answered with a non-success status
    #[error("storage request failed: {detail}")]
    RequestFailed { status: u16, detail: String },

    /// The store answered successfully but the body was not the expected shape
    #[error("invalid response from storage: {0}")]
    InvalidResponse(String),

    /// Transport-level failure (connection, TLS, timeout)
    #[error("storage transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl StorageError {
    /// Create a ProfileNotFound error
    pub fn profile_not_found(orgchart_id: impl Into<String>) -> Self {
        Self::ProfileNotFound {
            orgchart_id: orgchart_id.into(),
        }
    }

    /// Create a RequestFailed error
    pub fn request_failed(status: u16, detail: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            detail: detail.into(),
        }
    }

    /// Create an InvalidResponse error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Best user-facing description of the failure.
    ///
    /// For status failures this is the status line plus server detail,
    /// without the "storage request failed" framing; callers compose their
    /// own context around it.
    pub fn detail(&self) -> String {
        match self {
            StorageError::RequestFailed { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

/// Compose the detail line for a failed response.
///
/// Format: `<status> <reason>`, then ` - <error>` when the body parses as
/// JSON with an `error` field, else ` (<snippet>)` with the first
/// [`ERROR_SNIPPET_LEN`] characters of an unparseable non-empty body.
pub fn response_detail(status: u16, reason: &str, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let mut detail = format!("{} {}", status, reason);
    let server_error = parsed
        .as_ref()
        .and_then(|value| value.get("error"))
        .and_then(Value::as_str);
    if let Some(message) = server_error {
        detail.push_str(" - ");
        detail.push_str(message);
    } else if parsed.is_none() && !body.is_empty() {
        let snippet: String = body.chars().take(ERROR_SNIPPET_LEN).collect();
        detail.push_str(" (");
        detail.push_str(&snippet);
        detail.push(')');
    }
    detail
}
