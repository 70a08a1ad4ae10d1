//! Roster Reconciliation
//!
//! Projects the employee roster into the canonical node table. The
//! projection is one-way: roster rows become employee nodes, each distinct
//! (department, manager) pair becomes a grouping node, and canonical rows
//! that the projection no longer produces are deleted. Saved chart
//! profiles are never touched; they diverge from the projection by design
//! and only pick up roster changes when an editor rebuilds from the
//! directory.
//!
//! A full sync regenerates every row and prunes the rest. A single-row
//! sync runs after one roster record changes, and doubles as cleanup when
//! the record is gone.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::OrgStore;
use crate::models::{
    is_probation_period, RosterRow, StoredNode, DEPARTMENT_TITLE, EMPLOYEE_TAG, GROUP_TAG,
    PROBATION_TAG,
};
use crate::services::error::SyncError;

/// Where employee card photos live; the employee id is the file stem.
pub const DEFAULT_IMAGE_BASE_URL: &str =
    "https://raw.githubusercontent.com/Luannt1005/test-images/main/";

/// Result summary of a reconciliation run.
///
/// Field presence matches the run that produced it: a single-row sync
/// reports only its own counters, a full sync reports the whole batch.
/// `employees` counts every roster row read, including rows skipped for a
/// blank id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employees: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departments: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<usize>,
}

impl SyncReport {
    fn message_only(success: bool, message: &str) -> Self {
        SyncReport {
            success,
            message: Some(message.to_string()),
            employees: None,
            departments: None,
            total: None,
            updated: None,
            deleted: None,
        }
    }

    /// The roster row was gone; its node was removed instead.
    pub fn employee_removed() -> Self {
        SyncReport {
            updated: Some(0),
            deleted: Some(1),
            ..SyncReport::message_only(true, "Employee removed from Orgchart")
        }
    }

    /// One employee and its department node were written.
    pub fn single_synced() -> Self {
        SyncReport {
            updated: Some(2),
            ..SyncReport::message_only(true, "Synced single employee")
        }
    }

    /// The roster row has no usable employee id.
    pub fn missing_emp_id() -> Self {
        SyncReport::message_only(false, "Missing Emp ID")
    }

    /// The roster is empty; nothing was written or pruned.
    pub fn nothing_to_sync() -> Self {
        SyncReport::message_only(true, "No employees to sync")
    }

    /// A full run finished.
    pub fn completed(employees: usize, departments: usize, total: usize, deleted: usize) -> Self {
        SyncReport {
            employees: Some(employees),
            departments: Some(departments),
            total: Some(total),
            updated: Some(total),
            deleted: Some(deleted),
            ..SyncReport::message_only(true, "Sync completed")
        }
    }
}

/// Projects roster rows into canonical chart nodes.
#[derive(Clone)]
pub struct RosterSync {
    store: Arc<dyn OrgStore>,
    image_base_url: String,
}

impl RosterSync {
    pub fn new(store: Arc<dyn OrgStore>) -> Self {
        RosterSync::with_image_base_url(store, DEFAULT_IMAGE_BASE_URL)
    }

    pub fn with_image_base_url(store: Arc<dyn OrgStore>, image_base_url: impl Into<String>) -> Self {
        RosterSync {
            store,
            image_base_url: image_base_url.into(),
        }
    }

    /// Reconcile one employee.
    ///
    /// A missing roster row deletes the matching node (the employee left).
    /// A present row rewrites both the employee node and its department
    /// node, so a manager or department change lands atomically.
    #[tracing::instrument(skip(self))]
    pub async fn sync_single(&self, employee_id: &str) -> Result<SyncReport, SyncError> {
        let row = match self.store.get_roster_row(employee_id).await? {
            Some(row) => row,
            None => {
                self.store.delete_nodes(&[employee_id.to_string()]).await?;
                tracing::info!(%employee_id, "Removed departed employee from chart");
                return Ok(SyncReport::employee_removed());
            }
        };

        let emp_id = row.trimmed_emp_id();
        if emp_id.is_empty() {
            return Ok(SyncReport::missing_emp_id());
        }

        let now = Utc::now();
        let nodes = vec![
            self.employee_node(&emp_id, &row, now),
            self.department_node(&row.department_key(), row.dept_name(), row.manager_id()),
        ];
        self.store.upsert_nodes(nodes).await?;
        tracing::debug!(%emp_id, "Synced single employee");
        Ok(SyncReport::single_synced())
    }

    /// Reconcile the whole roster.
    ///
    /// Builds the complete projection in memory, prunes canonical rows the
    /// projection no longer produces, then writes everything. Rows without
    /// an employee id are skipped but still counted in the report.
    #[tracing::instrument(skip(self))]
    pub async fn sync_full(&self) -> Result<SyncReport, SyncError> {
        let rows = self.store.list_roster_rows().await?;
        if rows.is_empty() {
            return Ok(SyncReport::nothing_to_sync());
        }

        let now = Utc::now();
        let mut output: Vec<StoredNode> = Vec::new();
        // Keyed by department key; the value is (name, manager) for the
        // group node appended after every employee.
        let mut departments: BTreeMap<String, (String, Option<String>)> = BTreeMap::new();

        for row in &rows {
            let emp_id = row.trimmed_emp_id();
            if emp_id.is_empty() {
                continue;
            }
            departments.insert(
                row.department_key(),
                (row.dept_name().to_string(), row.manager_id()),
            );
            output.push(self.employee_node(&emp_id, row, now));
        }

        for (dept_key, (dept, manager_id)) in &departments {
            output.push(self.department_node(dept_key, dept, manager_id.clone()));
        }

        let existing = self.store.node_ids().await?;
        let produced: HashSet<&str> = output.iter().map(|node| node.id.as_str()).collect();
        let stale: Vec<String> = existing
            .into_iter()
            .filter(|id| !produced.contains(id.as_str()))
            .collect();

        let mut deleted = 0;
        if !stale.is_empty() {
            deleted = self.store.delete_nodes(&stale).await?;
        }

        let total = output.len();
        if let Err(source) = self.store.upsert_nodes(output).await {
            if deleted > 0 {
                return Err(SyncError::Partial { deleted, source });
            }
            return Err(SyncError::Storage(source));
        }

        tracing::info!(
            employees = rows.len(),
            departments = departments.len(),
            total,
            deleted,
            "Roster sync completed"
        );
        Ok(SyncReport::completed(
            rows.len(),
            departments.len(),
            total,
            deleted,
        ))
    }

    /// Project one roster row into its employee node.
    ///
    /// The card image is always derived from the employee id, the node
    /// hangs under its manager (`pid`) and inside its department group
    /// (`stpid`), and employees still inside the probation window carry the
    /// probation tag on top of the employee tag.
    pub fn employee_node(&self, emp_id: &str, row: &RosterRow, now: DateTime<Utc>) -> StoredNode {
        let manager_id = row.manager_id();
        let dept = row.dept_name();
        let joining_date = row.formatted_joining_date();

        let mut tags = vec![EMPLOYEE_TAG];
        if !joining_date.is_empty() && is_probation_period(&joining_date, now) {
            tags.push(PROBATION_TAG);
        }

        StoredNode {
            id: emp_id.to_string(),
            pid: manager_id.clone(),
            stpid: Some(row.department_key()),
            name: row.full_name.clone().unwrap_or_default(),
            title: row.job_title.clone().unwrap_or_default(),
            image: Some(format!("{}{}.jpg", self.image_base_url, emp_id)),
            tags: json!(tags).to_string(),
            orig_pid: manager_id,
            dept: (!dept.is_empty()).then(|| dept.to_string()),
            bu: row.bu.clone().filter(|s| !s.is_empty()),
            node_type: row.dl_idl_staff.clone().filter(|s| !s.is_empty()),
            location: row.location.clone().filter(|s| !s.is_empty()),
            description: row.employee_type.clone().unwrap_or_default(),
            joining_date: Some(joining_date),
        }
    }

    /// Build the grouping node for one (department, manager) pair.
    ///
    /// Unlike employee nodes the `dept` field keeps an empty department
    /// name instead of dropping it, so the group still carries the exact
    /// name its key was derived from. A missing manager renders as the
    /// literal `null` in the description, matching the key format.
    pub fn department_node(
        &self,
        dept_key: &str,
        dept: &str,
        manager_id: Option<String>,
    ) -> StoredNode {
        StoredNode {
            id: dept_key.to_string(),
            pid: manager_id.clone(),
            stpid: None,
            name: dept.to_string(),
            title: DEPARTMENT_TITLE.to_string(),
            image: None,
            tags: json!([GROUP_TAG]).to_string(),
            orig_pid: manager_id.clone(),
            dept: Some(dept.to_string()),
            bu: None,
            node_type: Some(GROUP_TAG.to_string()),
            location: None,
            description: format!(
                "Dept under manager {}",
                manager_id.as_deref().unwrap_or("null")
            ),
            joining_date: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn roster_row(emp_id: &str) -> RosterRow {
        let mut row = RosterRow::new(emp_id);
        row.full_name = Some("Avery Quinn".to_string());
        row.job_title = Some("Engineer".to_string());
        row.dept = Some("Sales".to_string());
        row.line_manager = Some("00100: Morgan Vu".to_string());
        row.employee_type = Some("Full-time".to_string());
        row.joining_date = Some("15/03/2020".to_string());
        row
    }

    async fn service_with_rows(rows: Vec<RosterRow>) -> (RosterSync, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.seed_roster(rows).await;
        (RosterSync::new(store.clone()), store)
    }

    #[test]
    fn test_employee_node_projection() {
        let sync = RosterSync::new(Arc::new(MemoryStore::new()));
        let now = Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap();
        let mut row = roster_row("200");
        row.bu = Some("Manufacturing".to_string());
        row.dl_idl_staff = Some("DL".to_string());
        row.location = Some("Hanoi".to_string());

        let node = sync.employee_node("200", &row, now);
        assert_eq!(node.id, "200");
        assert_eq!(node.pid.as_deref(), Some("100"));
        assert_eq!(node.stpid.as_deref(), Some("dept:Sales:100"));
        assert_eq!(node.name, "Avery Quinn");
        assert_eq!(node.title, "Engineer");
        assert_eq!(
            node.image.as_deref(),
            Some("https://raw.githubusercontent.com/Luannt1005/test-images/main/200.jpg")
        );
        assert_eq!(node.tags, r#"["emp"]"#);
        assert_eq!(node.orig_pid.as_deref(), Some("100"));
        assert_eq!(node.dept.as_deref(), Some("Sales"));
        assert_eq!(node.bu.as_deref(), Some("Manufacturing"));
        assert_eq!(node.node_type.as_deref(), Some("DL"));
        assert_eq!(node.location.as_deref(), Some("Hanoi"));
        assert_eq!(node.description, "Full-time");
        assert_eq!(node.joining_date.as_deref(), Some("15/03/2020"));
    }

    #[test]
    fn test_employee_node_blank_optionals_become_none() {
        let sync = RosterSync::new(Arc::new(MemoryStore::new()));
        let now = Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap();
        let mut row = RosterRow::new("200");
        row.dept = Some(String::new());
        row.bu = Some(String::new());

        let node = sync.employee_node("200", &row, now);
        assert_eq!(node.dept, None);
        assert_eq!(node.bu, None);
        assert_eq!(node.stpid.as_deref(), Some("dept::null"));
        assert_eq!(node.joining_date.as_deref(), Some(""));
    }

    #[test]
    fn test_probation_tag_within_window() {
        let sync = RosterSync::new(Arc::new(MemoryStore::new()));
        let now = Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap();

        let mut row = roster_row("200");
        row.joining_date = Some("26/07/2026".to_string());
        let node = sync.employee_node("200", &row, now);
        assert_eq!(node.tags, r#"["emp","Emp_probation"]"#);

        row.joining_date = Some("27/05/2026".to_string());
        let node = sync.employee_node("200", &row, now);
        assert_eq!(node.tags, r#"["emp"]"#);

        // Future joiners are not probation
        row.joining_date = Some("25/09/2026".to_string());
        let node = sync.employee_node("200", &row, now);
        assert_eq!(node.tags, r#"["emp"]"#);
    }

    #[test]
    fn test_department_node_projection() {
        let sync = RosterSync::new(Arc::new(MemoryStore::new()));
        let node = sync.department_node("dept:Sales:100", "Sales", Some("100".to_string()));
        assert_eq!(node.id, "dept:Sales:100");
        assert_eq!(node.pid.as_deref(), Some("100"));
        assert_eq!(node.stpid, None);
        assert_eq!(node.name, "Sales");
        assert_eq!(node.title, "Department");
        assert_eq!(node.image, None);
        assert_eq!(node.tags, r#"["group"]"#);
        assert_eq!(node.dept.as_deref(), Some("Sales"));
        assert_eq!(node.node_type.as_deref(), Some("group"));
        assert_eq!(node.description, "Dept under manager 100");
        assert!(node.is_group());
    }

    #[test]
    fn test_department_node_missing_manager_renders_null() {
        let sync = RosterSync::new(Arc::new(MemoryStore::new()));
        let node = sync.department_node("dept::null", "", None);
        assert_eq!(node.pid, None);
        assert_eq!(node.dept.as_deref(), Some(""));
        assert_eq!(node.description, "Dept under manager null");
    }

    #[tokio::test]
    async fn test_single_sync_writes_employee_and_department() -> anyhow::Result<()> {
        let (sync, store) = service_with_rows(vec![roster_row("200")]).await;

        let report = sync.sync_single("200").await?;
        assert_eq!(report, SyncReport::single_synced());

        let nodes = store.list_nodes(None).await?;
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().any(|n| n.id == "200"));
        assert!(nodes.iter().any(|n| n.id == "dept:Sales:100"));
        Ok(())
    }

    #[tokio::test]
    async fn test_single_sync_missing_row_deletes_node() -> anyhow::Result<()> {
        let (sync, store) = service_with_rows(vec![]).await;
        store.seed_directory(vec![StoredNode::new("200")]).await;

        let report = sync.sync_single("200").await?;
        assert_eq!(report, SyncReport::employee_removed());
        assert!(store.list_nodes(None).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_single_sync_blank_emp_id_reports_failure() -> anyhow::Result<()> {
        let (sync, store) = service_with_rows(vec![roster_row("   ")]).await;

        let report = sync.sync_single("   ").await?;
        assert!(!report.success);
        assert_eq!(report.message.as_deref(), Some("Missing Emp ID"));
        assert!(store.list_nodes(None).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_single_sync_probation_window_end_to_end() -> anyhow::Result<()> {
        let mut row = roster_row("200");
        row.joining_date = Some((Utc::now() - Duration::days(30)).format("%d/%m/%Y").to_string());
        let (sync, store) = service_with_rows(vec![row]).await;

        sync.sync_single("200").await?;
        let nodes = store.list_nodes(None).await?;
        let node = nodes.iter().find(|n| n.id == "200").unwrap();
        let tags = node.tag_list();
        assert!(tags.contains(&"emp".to_string()));
        assert!(tags.contains(&"Emp_probation".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_full_sync_builds_complete_projection() -> anyhow::Result<()> {
        let mut second = roster_row("201");
        second.full_name = Some("Riley Vo".to_string());
        second.dept = Some("Quality".to_string());
        let (sync, store) = service_with_rows(vec![roster_row("200"), second]).await;

        let report = sync.sync_full().await?;
        assert!(report.success);
        assert_eq!(report.message.as_deref(), Some("Sync completed"));
        assert_eq!(report.employees, Some(2));
        assert_eq!(report.departments, Some(2));
        assert_eq!(report.total, Some(4));
        assert_eq!(report.updated, Some(4));
        assert_eq!(report.deleted, Some(0));

        let nodes = store.list_nodes(None).await?;
        assert_eq!(nodes.len(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_full_sync_prunes_stale_nodes() -> anyhow::Result<()> {
        let (sync, store) = service_with_rows(vec![roster_row("200")]).await;
        store.seed_directory(vec![StoredNode::new("departed")]).await;

        let report = sync.sync_full().await?;
        assert_eq!(report.deleted, Some(1));

        let ids = store.node_ids().await?;
        assert!(!ids.contains(&"departed".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_full_sync_is_idempotent() -> anyhow::Result<()> {
        let mut second = roster_row("201");
        second.dept = Some("Quality".to_string());
        let (sync, store) = service_with_rows(vec![roster_row("200"), second]).await;
        store.seed_directory(vec![StoredNode::new("departed")]).await;

        let first = sync.sync_full().await?;
        let snapshot = store.list_nodes(None).await?;

        let second_run = sync.sync_full().await?;
        assert_eq!(first.total, second_run.total);
        assert_eq!(second_run.deleted, Some(0));
        assert_eq!(store.list_nodes(None).await?, snapshot);
        Ok(())
    }

    #[tokio::test]
    async fn test_full_sync_skips_blank_ids_but_counts_rows() -> anyhow::Result<()> {
        let blank = RosterRow::new("  ");
        let (sync, store) = service_with_rows(vec![roster_row("200"), blank]).await;

        let report = sync.sync_full().await?;
        assert_eq!(report.employees, Some(2));
        // One employee node plus its department node
        assert_eq!(report.total, Some(2));

        let ids = store.node_ids().await?;
        assert_eq!(ids.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_full_sync_shares_department_nodes() -> anyhow::Result<()> {
        let mut second = roster_row("201");
        second.full_name = Some("Riley Vo".to_string());
        let (sync, _) = service_with_rows(vec![roster_row("200"), second]).await;

        let report = sync.sync_full().await?;
        assert_eq!(report.departments, Some(1));
        assert_eq!(report.total, Some(3));
        Ok(())
    }

    #[tokio::test]
    async fn test_full_sync_empty_roster_touches_nothing() -> anyhow::Result<()> {
        let (sync, store) = service_with_rows(vec![]).await;
        store.seed_directory(vec![StoredNode::new("kept")]).await;

        let report = sync.sync_full().await?;
        assert_eq!(report, SyncReport::nothing_to_sync());
        // Early return happens before pruning
        assert_eq!(store.node_ids().await?, vec!["kept".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_full_sync_leaves_saved_profiles_alone() -> anyhow::Result<()> {
        let (sync, store) = service_with_rows(vec![roster_row("200")]).await;
        let profile = store
            .create_profile(crate::models::NewProfile {
                username: "avery".to_string(),
                orgchart_name: "Snapshot".to_string(),
                describe: None,
                org_data: Some(json!({ "data": [{"id": "custom", "name": "Hand Edited"}] })),
            })
            .await?;

        sync.sync_full().await?;

        let after = store.get_profile(&profile.orgchart_id).await?.unwrap();
        assert_eq!(after.org_data, json!({ "data": [{"id": "custom", "name": "Hand Edited"}] }));
        Ok(())
    }

    #[test]
    fn test_report_wire_shapes() {
        assert_eq!(
            serde_json::to_value(SyncReport::employee_removed()).unwrap(),
            json!({
                "success": true,
                "message": "Employee removed from Orgchart",
                "updated": 0,
                "deleted": 1
            })
        );
        assert_eq!(
            serde_json::to_value(SyncReport::single_synced()).unwrap(),
            json!({
                "success": true,
                "message": "Synced single employee",
                "updated": 2
            })
        );
        assert_eq!(
            serde_json::to_value(SyncReport::missing_emp_id()).unwrap(),
            json!({ "success": false, "message": "Missing Emp ID" })
        );
        assert_eq!(
            serde_json::to_value(SyncReport::nothing_to_sync()).unwrap(),
            json!({ "success": true, "message": "No employees to sync" })
        );
    }
}
