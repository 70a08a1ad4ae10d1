//! OrgBoard Core Engine
//!
//! This crate provides the chart document model, editing session, and roster
//! reconciliation for the OrgBoard org chart system.
//!
//! # Architecture
//!
//! - **Tolerant documents**: chart profiles store raw JSON node arrays;
//!   [`models::ChartNode::from_value`] normalizes whatever shape older
//!   saves left behind
//! - **Canonical projection**: one flat node table derived from the HR
//!   roster is the source the widget and every profile copy render from
//! - **Session over store**: [`editor::ChartSession`] owns in-memory edits
//!   and dirty state; persistence goes through the [`db::OrgStore`] trait
//! - **Derived, not authored**: Roster Reconciliation rebuilds the
//!   projection from roster rows, so manual fixes live in profiles, never
//!   in the projection
//!
//! # Modules
//!
//! - [`models`] - Data structures (ChartNode, RosterRow, ChartProfile)
//! - [`editor`] - Editing session, canvas wiring, and controller
//! - [`services`] - Business services (RosterSync, ProfileService)
//! - [`db`] - Storage backends behind the OrgStore trait
//! - [`api`] - REST surface over axum

pub mod models;
pub mod editor;
pub mod services;
pub mod db;
pub mod api;

// Re-export commonly used types
pub use models::*;
pub use editor::*;
pub use services::*;
