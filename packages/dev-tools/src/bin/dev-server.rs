//! Development HTTP Server Binary
//!
//! Standalone binary that serves the org chart REST API without the hosted
//! document store. This enables local widget development and API testing
//! against an in-memory backend seeded with a demo roster.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (port 3001, in-memory store)
//! cargo run --bin dev-server
//!
//! # Custom port
//! DEV_SERVER_PORT=3002 cargo run --bin dev-server
//!
//! # Proxy to a hosted store instead of the in-memory backend
//! ORGBOARD_STORE_URL=https://charts.example.com cargo run --bin dev-server
//! ```
//!
//! # Environment Variables
//!
//! - `DEV_SERVER_PORT`: Server port (default: 3001)
//! - `ORGBOARD_STORE_URL`: Base URL of a hosted store; when unset the server
//!   runs on an in-memory store seeded with demo data
//! - `ORGBOARD_SEED`: Path to a JSON file (array of roster records) used
//!   instead of the built-in demo roster
//! - `CORS_ALLOW_ORIGIN`: Extra allowed origin for the widget host
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")
//!
//! # Security
//!
//! **DEVELOPMENT ONLY** - This binary should never be used in production:
//! - No authentication
//! - CORS restricted to localhost
//! - Demo data seeded on startup
//!
//! # Architecture
//!
//! The server wires the same [`AppState`] and router the production API
//! uses. The only additions here are the CORS layer for local widget hosts
//! and the demo seed: a small roster plus one saved chart, so the sync and
//! editor endpoints respond with data immediately.

use std::env;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, Method};
use chrono::{Duration, Utc};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use orgboard_core::api::{create_router, AppState};
use orgboard_core::db::{MemoryStore, OrgStore, RestStore};
use orgboard_core::{NewProfile, RosterRow};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🚀 OrgBoard HTTP Dev Server");
    tracing::info!("==================================");

    // Get server port from environment or use default
    let port = env::var("DEV_SERVER_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3001);

    tracing::info!("📡 Port: {}", port);

    // Pick the storage backend
    let store: Arc<dyn OrgStore> = match env::var("ORGBOARD_STORE_URL") {
        Ok(url) => {
            tracing::info!("📦 Store: hosted facade at {}", url);
            Arc::new(RestStore::new(url)?)
        }
        Err(_) => {
            let store = Arc::new(MemoryStore::new());
            match env::var("ORGBOARD_SEED") {
                Ok(path) => {
                    let rows = load_seed_file(&path).await?;
                    tracing::info!("📦 Store: in-memory, {} roster rows from {}", rows.len(), path);
                    store.seed_roster(rows).await;
                }
                Err(_) => {
                    seed_demo_data(&store).await?;
                    tracing::info!("📦 Store: in-memory with demo roster");
                }
            }
            store
        }
    };

    tracing::info!("✅ Services initialized");

    // Start HTTP server
    let state = AppState::new(store);
    let app = create_router(state).layer(cors_layer());

    let addr = format!("127.0.0.1:{}", port);
    tracing::info!("🚀 HTTP dev server starting on http://{}", addr);
    tracing::info!("📡 CORS enabled for local widget hosts");
    tracing::info!("⚠️  Development mode only - NOT for production use");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create CORS layer for development
///
/// Allows requests from common local widget hosts. Supports a custom origin
/// via the CORS_ALLOW_ORIGIN environment variable for other setups.
///
/// Default: localhost 5173 / 3000 / 8080
/// Configure: CORS_ALLOW_ORIGIN="http://localhost:4200" cargo run ...
fn cors_layer() -> CorsLayer {
    // Allow the common local dev server ports
    let default_origins = [
        "http://localhost:5173", // Vite default
        "http://localhost:3000", // webpack dev server default
        "http://localhost:8080", // static page preview
    ];

    // Check for custom CORS origin from environment
    let origins: Vec<header::HeaderValue> =
        if let Ok(custom_origin) = std::env::var("CORS_ALLOW_ORIGIN") {
            vec![custom_origin
                .parse::<header::HeaderValue>()
                .expect("Invalid CORS_ALLOW_ORIGIN - must be valid HTTP origin")]
        } else {
            default_origins
                .iter()
                .map(|o| o.parse::<header::HeaderValue>().unwrap())
                .collect()
        };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .allow_credentials(false)
}

/// Load roster rows from a JSON file holding an array of roster records.
async fn load_seed_file(path: &str) -> anyhow::Result<Vec<RosterRow>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read seed file {}", path))?;
    let rows: Vec<RosterRow> = serde_json::from_str(&raw)
        .with_context(|| format!("Seed file {} is not a JSON array of roster records", path))?;
    Ok(rows)
}

/// Seed the in-memory store with a small plant roster and one saved chart.
///
/// The roster covers three departments under one director, with one joiner
/// recent enough to pick up the probation tag on sync. Hitting
/// `POST /api/sync` right after startup projects all of it into the
/// directory.
async fn seed_demo_data(store: &MemoryStore) -> anyhow::Result<()> {
    let recent_joiner = (Utc::now() - Duration::days(30))
        .format("%d/%m/%Y")
        .to_string();

    store
        .seed_roster(vec![
            RosterRow {
                full_name: Some("Dana Reeve".to_string()),
                job_title: Some("Plant Director".to_string()),
                dept: Some("Management".to_string()),
                bu: Some("Manufacturing".to_string()),
                location: Some("Hanoi".to_string()),
                joining_date: Some("12/03/2015".to_string()),
                ..RosterRow::new("1001")
            },
            RosterRow {
                full_name: Some("Minh Tran".to_string()),
                job_title: Some("Assembly Supervisor".to_string()),
                dept: Some("Assembly".to_string()),
                bu: Some("Manufacturing".to_string()),
                line_manager: Some("1001".to_string()),
                location: Some("Hanoi".to_string()),
                joining_date: Some("04/07/2018".to_string()),
                ..RosterRow::new("1002")
            },
            RosterRow {
                full_name: Some("Priya Sharma".to_string()),
                job_title: Some("Assembly Technician".to_string()),
                dept: Some("Assembly".to_string()),
                bu: Some("Manufacturing".to_string()),
                line_manager: Some("1002".to_string()),
                location: Some("Hanoi".to_string()),
                joining_date: Some("21/02/2022".to_string()),
                ..RosterRow::new("1003")
            },
            RosterRow {
                full_name: Some("Jonas Weber".to_string()),
                job_title: Some("Tooling Engineer".to_string()),
                dept: Some("Tooling".to_string()),
                bu: Some("Manufacturing".to_string()),
                line_manager: Some("1001".to_string()),
                location: Some("Hanoi".to_string()),
                joining_date: Some("30/10/2019".to_string()),
                ..RosterRow::new("1004")
            },
            RosterRow {
                full_name: Some("Linh Pham".to_string()),
                job_title: Some("Quality Inspector".to_string()),
                dept: Some("Quality".to_string()),
                bu: Some("Manufacturing".to_string()),
                line_manager: Some("1001".to_string()),
                location: Some("Hanoi".to_string()),
                joining_date: Some(recent_joiner),
                ..RosterRow::new("1005")
            },
        ])
        .await;

    store
        .create_profile(NewProfile {
            username: "demo".to_string(),
            orgchart_name: "Main Floor".to_string(),
            describe: Some("Seeded demo chart".to_string()),
            org_data: Some(json!({
                "data": [
                    {
                        "id": "1001",
                        "name": "Dana Reeve",
                        "title": "Plant Director",
                        "tags": ["boss"],
                    },
                    {
                        "id": "dept:Assembly:1001",
                        "pid": "1001",
                        "name": "Assembly",
                        "title": "Department",
                        "dept": "Assembly",
                        "tags": ["group"],
                    },
                    {
                        "id": "1002",
                        "stpid": "dept:Assembly:1001",
                        "name": "Minh Tran",
                        "title": "Assembly Supervisor",
                        "dept": "Assembly",
                        "tags": ["emp"],
                    },
                ]
            })),
        })
        .await?;

    Ok(())
}
