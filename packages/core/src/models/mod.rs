//! Data Models
//!
//! This module contains the core data structures used throughout OrgBoard:
//!
//! - `ChartNode` / `StoredNode` - one box on the chart, in document and
//!   canonical-row form
//! - `ChartProfile` - a named, user-owned snapshot of a node list
//! - `RosterRow` - the canonical HR record the node projection is derived
//!   from
//!
//! Models keep the persisted wire field names so they serialize directly
//! into the shapes the chart widget, the profile store, and the sync
//! trigger exchange.

mod employee;
mod node;
mod profile;

pub use employee::{
    format_joining_date, is_probation_period, trim_leading_zeros, ApprovalStatus, RosterRow,
    PROBATION_WINDOW_DAYS, RAW_JOINING_DATE_KEY, RAW_LINE_MANAGER_KEY,
};
pub use node::{
    ChartNode, NodePatch, StoredNode, DEPARTMENT_TITLE, EMPLOYEE_TAG, GROUP_TAG,
    OPEN_HEADCOUNT_TAG, PROBATION_TAG,
};
pub use profile::{ChartProfile, DeleteResult, NewProfile, ProfileSummary, ProfileUpdate};
