//! HTTP API for the org chart engine
//!
//! This module exposes the chart store over REST so the editing widget,
//! the roster scheduler, and operators all talk to one surface. Handlers
//! stay thin: each one parses the request, calls into [`crate::db`] or
//! [`crate::services`], and maps the outcome onto the wire envelopes the
//! widget already consumes.
//!
//! # Architecture
//!
//! Endpoints are organized into one module per resource:
//! - `profile_endpoints`: chart profile CRUD (`/api/orgcharts`)
//! - `directory_endpoints`: canonical node projection and departments
//! - `roster_endpoints`: read-only roster inspection
//! - `sync_endpoints`: Roster Reconciliation triggers
//!
//! # Usage
//!
//! Build an [`AppState`] around any [`crate::db::OrgStore`] and hand it to
//! [`create_router`]:
//!
//! ```rust,ignore
//! let state = AppState::new(Arc::new(MemoryStore::new()));
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

use axum::{response::Json, routing::get, Router};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::db::OrgStore;
use crate::services::{ProfileService, RosterSync};

// Chart profile CRUD
mod profile_endpoints;

// Canonical node projection and department registration
mod directory_endpoints;

// Read-only roster inspection
mod roster_endpoints;

// Roster Reconciliation triggers
mod sync_endpoints;

// Shared HTTP error handling
mod http_error;

// Re-export ApiError for use by endpoint modules
pub use http_error::ApiError;

/// Application state shared across all endpoints.
///
/// Cloning is cheap: the store is behind an [`Arc`] and both services hold
/// handles to that same store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OrgStore>,
    pub profiles: ProfileService,
    pub sync: RosterSync,
}

impl AppState {
    /// Build the state and its services around one storage backend.
    pub fn new(store: Arc<dyn OrgStore>) -> Self {
        AppState {
            profiles: ProfileService::new(store.clone()),
            sync: RosterSync::new(store.clone()),
            store,
        }
    }

    /// Build the state with a reconciliation pass that prefixes photo URLs
    /// with `image_base_url` instead of the default host.
    pub fn with_image_base_url(store: Arc<dyn OrgStore>, image_base_url: &str) -> Self {
        AppState {
            profiles: ProfileService::new(store.clone()),
            sync: RosterSync::with_image_base_url(store.clone(), image_base_url),
            store,
        }
    }
}

/// Wall-clock timestamp in the millisecond RFC 3339 form the response
/// envelopes carry.
pub(crate) fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: String,
    version: String,
}

/// Liveness probe.
async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create the main application router with all endpoint modules
///
/// This function uses axum's modular routing pattern: each resource module
/// owns its routes and merges them here.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .merge(profile_endpoints::routes(state.clone()))
        .merge(directory_endpoints::routes(state.clone()))
        .merge(roster_endpoints::routes(state.clone()))
        .merge(sync_endpoints::routes(state))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::StoredNode;

    #[tokio::test]
    async fn state_services_share_the_backend() {
        let store = Arc::new(MemoryStore::new());
        store.seed_directory(vec![StoredNode::new("100")]).await;

        let state = AppState::new(store);
        let nodes = state.store.list_nodes(None).await.unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "100");
    }

    #[tokio::test]
    async fn health_reports_package_version() {
        let Json(body) = health_check().await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }
}
