//! OrgStore Trait - Storage Abstraction Layer
//!
//! This module defines the `OrgStore` trait that abstracts persistence for
//! chart profiles, the synced node directory, and the employee roster. The
//! trait enables multiple backends (in-memory for tests and the dev server,
//! REST for a hosted document store) without changing the editor or the
//! reconciliation logic.
//!
//! # Architecture
//!
//! - **Abstraction point**: between the editing/reconciliation layers and
//!   the storage backend
//! - **Async-first**: every method is async so network-backed stores fit
//!   without special cases
//! - **Missing is not an error**: point lookups return `Ok(None)` for
//!   absent records; [`StorageError`] is reserved for real failures
//!
//! # Data Sets
//!
//! Three independent record families share one trait because every caller
//! that needs one ends up needing the others:
//!
//! - **Chart profiles**: named, user-owned node-list documents
//! - **Node directory**: the canonical projection maintained by roster
//!   reconciliation (one row per employee/department node)
//! - **Roster**: the employee master data reconciliation reads from

use async_trait::async_trait;

use crate::db::error::StorageError;
use crate::models::{
    ChartProfile, DeleteResult, NewProfile, ProfileSummary, ProfileUpdate, RosterRow, StoredNode,
};

/// Abstraction over chart-profile, node-directory, and roster persistence.
///
/// Implementations must be `Send + Sync`; callers hold them behind
/// `Arc<dyn OrgStore>` and may use them from multiple tasks.
#[async_trait]
pub trait OrgStore: Send + Sync {
    //
    // CHART PROFILES
    //

    /// List profiles owned by a user, newest first.
    async fn list_profiles(&self, owner: &str) -> Result<Vec<ProfileSummary>, StorageError>;

    /// Fetch one profile with its full node-list document.
    ///
    /// Returns `Ok(None)` when the profile does not exist.
    async fn get_profile(&self, orgchart_id: &str) -> Result<Option<ChartProfile>, StorageError>;

    /// Create a profile, returning it with its storage-assigned id.
    async fn create_profile(&self, profile: NewProfile) -> Result<ChartProfile, StorageError>;

    /// Apply a partial update to a profile.
    ///
    /// Fails with [`StorageError::ProfileNotFound`] when the profile does
    /// not exist.
    async fn update_profile(
        &self,
        orgchart_id: &str,
        update: ProfileUpdate,
    ) -> Result<ChartProfile, StorageError>;

    /// Delete a profile. Deleting a missing profile is not an error.
    async fn delete_profile(&self, orgchart_id: &str) -> Result<DeleteResult, StorageError>;

    //
    // NODE DIRECTORY
    //

    /// List directory rows, optionally restricted to one department name.
    async fn list_nodes(&self, dept: Option<&str>) -> Result<Vec<StoredNode>, StorageError>;

    /// Every node id currently in the directory.
    ///
    /// Full reconciliation diffs these against the target set, so the
    /// listing must be complete. Backends whose unfiltered `list_nodes`
    /// is shaped for rendering must override this.
    async fn node_ids(&self) -> Result<Vec<String>, StorageError> {
        let nodes = self.list_nodes(None).await?;
        Ok(nodes.into_iter().map(|node| node.id).collect())
    }

    /// Insert or overwrite directory rows by id, returning the count written.
    async fn upsert_nodes(&self, nodes: Vec<StoredNode>) -> Result<usize, StorageError>;

    /// Delete directory rows by id, returning the count actually removed.
    async fn delete_nodes(&self, ids: &[String]) -> Result<usize, StorageError>;

    //
    // EMPLOYEE ROSTER
    //

    /// Fetch one roster row by its employee id.
    ///
    /// Returns `Ok(None)` when the employee is no longer on the roster.
    async fn get_roster_row(&self, employee_id: &str) -> Result<Option<RosterRow>, StorageError>;

    /// Fetch the entire roster.
    async fn list_roster_rows(&self) -> Result<Vec<RosterRow>, StorageError>;

    /// Fetch the roster rows of one department.
    ///
    /// Used when duplicating a department's current staffing into a new
    /// chart profile.
    async fn dept_roster_rows(&self, dept: &str) -> Result<Vec<RosterRow>, StorageError>;
}
