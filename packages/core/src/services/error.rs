//! Service Layer Error Types
//!
//! This module defines error types for service-layer operations. The API
//! layer maps these onto the wire shapes clients already parse, so the
//! displayed messages here are part of the interface.

use crate::db::StorageError;
use thiserror::Error;

/// Roster reconciliation errors
#[derive(Error, Debug)]
pub enum SyncError {
    /// A write failed after stale-node deletions had already been applied.
    /// The projection may be missing rows until the next successful full
    /// sync; a rerun repairs it.
    #[error("sync aborted after {deleted} deletions: {source}")]
    Partial {
        deleted: usize,
        #[source]
        source: StorageError,
    },

    /// Storage operation failed before anything was modified
    #[error("storage operation failed: {0}")]
    Storage(#[from] StorageError),
}

/// Chart profile management errors
#[derive(Error, Debug)]
pub enum ProfileError {
    /// A create request arrived without an owner or a chart name. The
    /// message text is the wire error body for that request.
    #[error("Missing required fields")]
    MissingFields,

    /// Building a chart from a department that has no directory rows.
    /// Callers usually confirm and retry with an empty chart instead.
    #[error("no directory entries found for department \"{dept}\"")]
    EmptyDepartment { dept: String },

    /// Storage operation failed
    #[error("storage operation failed: {0}")]
    Storage(#[from] StorageError),
}

impl ProfileError {
    /// Create an empty department error
    pub fn empty_department(dept: impl Into<String>) -> Self {
        ProfileError::EmptyDepartment { dept: dept.into() }
    }
}
