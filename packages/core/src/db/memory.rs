//! In-Memory Store
//!
//! [`MemoryStore`] keeps all three record families in `tokio::sync::RwLock`
//! maps. It backs unit and integration tests and the local dev server;
//! production deployments use [`crate::db::RestStore`] against the hosted
//! document store.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::error::StorageError;
use crate::db::org_store::OrgStore;
use crate::models::{
    ChartProfile, DeleteResult, NewProfile, ProfileSummary, ProfileUpdate, RosterRow, StoredNode,
};

/// In-memory [`OrgStore`] implementation.
///
/// Share it behind `Arc`; interior locks make `&self` methods safe from
/// any task. Directory rows iterate in id order, which keeps listings
/// deterministic for tests.
#[derive(Default)]
pub struct MemoryStore {
    profiles: RwLock<HashMap<String, ChartProfile>>,
    directory: RwLock<BTreeMap<String, StoredNode>>,
    roster: RwLock<Vec<RosterRow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload roster rows, keeping any already present.
    pub async fn seed_roster(&self, rows: Vec<RosterRow>) {
        let mut roster = self.roster.write().await;
        roster.extend(rows);
    }

    /// Preload directory rows, overwriting by id.
    pub async fn seed_directory(&self, nodes: Vec<StoredNode>) {
        let mut directory = self.directory.write().await;
        for node in nodes {
            directory.insert(node.id.clone(), node);
        }
    }

    /// Drop a roster row, simulating an employee leaving between syncs.
    pub async fn remove_roster_row(&self, employee_id: &str) -> bool {
        let mut roster = self.roster.write().await;
        let before = roster.len();
        roster.retain(|row| row.emp_id != employee_id);
        roster.len() != before
    }
}

#[async_trait]
impl OrgStore for MemoryStore {
    async fn list_profiles(&self, owner: &str) -> Result<Vec<ProfileSummary>, StorageError> {
        let profiles = self.profiles.read().await;
        let mut owned: Vec<&ChartProfile> = profiles
            .values()
            .filter(|profile| profile.username == owner)
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned.into_iter().map(ChartProfile::summary).collect())
    }

    async fn get_profile(&self, orgchart_id: &str) -> Result<Option<ChartProfile>, StorageError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(orgchart_id).cloned())
    }

    async fn create_profile(&self, profile: NewProfile) -> Result<ChartProfile, StorageError> {
        let now = Utc::now();
        let created = ChartProfile {
            orgchart_id: Uuid::new_v4().to_string(),
            orgchart_name: profile.orgchart_name,
            describe: profile.describe,
            org_data: profile
                .org_data
                .unwrap_or_else(ChartProfile::empty_org_data),
            username: profile.username,
            created_at: now,
            updated_at: now,
        };
        let mut profiles = self.profiles.write().await;
        profiles.insert(created.orgchart_id.clone(), created.clone());
        Ok(created)
    }

    async fn update_profile(
        &self,
        orgchart_id: &str,
        update: ProfileUpdate,
    ) -> Result<ChartProfile, StorageError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .get_mut(orgchart_id)
            .ok_or_else(|| StorageError::profile_not_found(orgchart_id))?;
        if let Some(name) = update.orgchart_name {
            // A blank name never overwrites the stored one.
            if !name.trim().is_empty() {
                profile.orgchart_name = name;
            }
        }
        if let Some(describe) = update.describe {
            profile.describe = describe;
        }
        if let Some(org_data) = update.org_data {
            profile.org_data = org_data.unwrap_or_else(ChartProfile::empty_org_data);
        }
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn delete_profile(&self, orgchart_id: &str) -> Result<DeleteResult, StorageError> {
        let mut profiles = self.profiles.write().await;
        match profiles.remove(orgchart_id) {
            Some(_) => Ok(DeleteResult::existed()),
            None => Ok(DeleteResult::not_found()),
        }
    }

    async fn list_nodes(&self, dept: Option<&str>) -> Result<Vec<StoredNode>, StorageError> {
        let directory = self.directory.read().await;
        let nodes = directory
            .values()
            .filter(|node| match dept {
                Some(dept) => node.dept.as_deref() == Some(dept),
                None => true,
            })
            .cloned()
            .collect();
        Ok(nodes)
    }

    async fn node_ids(&self) -> Result<Vec<String>, StorageError> {
        let directory = self.directory.read().await;
        Ok(directory.keys().cloned().collect())
    }

    async fn upsert_nodes(&self, nodes: Vec<StoredNode>) -> Result<usize, StorageError> {
        let mut directory = self.directory.write().await;
        let count = nodes.len();
        for node in nodes {
            directory.insert(node.id.clone(), node);
        }
        Ok(count)
    }

    async fn delete_nodes(&self, ids: &[String]) -> Result<usize, StorageError> {
        let mut directory = self.directory.write().await;
        let mut removed = 0;
        for id in ids {
            if directory.remove(id).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn get_roster_row(&self, employee_id: &str) -> Result<Option<RosterRow>, StorageError> {
        let roster = self.roster.read().await;
        Ok(roster
            .iter()
            .find(|row| row.emp_id == employee_id)
            .cloned())
    }

    async fn list_roster_rows(&self) -> Result<Vec<RosterRow>, StorageError> {
        let roster = self.roster.read().await;
        Ok(roster.clone())
    }

    async fn dept_roster_rows(&self, dept: &str) -> Result<Vec<RosterRow>, StorageError> {
        let roster = self.roster.read().await;
        Ok(roster
            .iter()
            .filter(|row| row.dept.as_deref() == Some(dept))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_profile(owner: &str, name: &str) -> NewProfile {
        NewProfile {
            username: owner.to_string(),
            orgchart_name: name.to_string(),
            describe: None,
            org_data: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_profile() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let created = store.create_profile(new_profile("avery", "Draft")).await?;
        assert!(!created.orgchart_id.is_empty());
        assert_eq!(created.org_data, json!({ "data": [] }));

        let fetched = store.get_profile(&created.orgchart_id).await?;
        assert_eq!(fetched, Some(created));
        assert_eq!(store.get_profile("missing").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_profiles_by_owner() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.create_profile(new_profile("avery", "One")).await?;
        store.create_profile(new_profile("avery", "Two")).await?;
        store.create_profile(new_profile("blair", "Theirs")).await?;

        let listed = store.list_profiles("avery").await?;
        assert_eq!(listed.len(), 2);
        assert!(store.list_profiles("nobody").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_profile_partial() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let created = store.create_profile(new_profile("avery", "Draft")).await?;

        let update = ProfileUpdate {
            orgchart_name: Some("Final".to_string()),
            describe: Some(Some("notes".to_string())),
            org_data: None,
        };
        let updated = store.update_profile(&created.orgchart_id, update).await?;
        assert_eq!(updated.orgchart_name, "Final");
        assert_eq!(updated.describe.as_deref(), Some("notes"));
        assert_eq!(updated.org_data, json!({ "data": [] }));

        // Blank name is ignored, explicit null describe clears.
        let update = ProfileUpdate {
            orgchart_name: Some("  ".to_string()),
            describe: Some(None),
            org_data: None,
        };
        let updated = store.update_profile(&created.orgchart_id, update).await?;
        assert_eq!(updated.orgchart_name, "Final");
        assert_eq!(updated.describe, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_profile_fails() {
        let store = MemoryStore::new();
        let result = store
            .update_profile("ghost", ProfileUpdate::default())
            .await;
        assert!(matches!(
            result,
            Err(StorageError::ProfileNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_profile_idempotent() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let created = store.create_profile(new_profile("avery", "Draft")).await?;

        assert_eq!(
            store.delete_profile(&created.orgchart_id).await?,
            DeleteResult::existed()
        );
        assert_eq!(
            store.delete_profile(&created.orgchart_id).await?,
            DeleteResult::not_found()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_directory_upsert_list_delete() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let mut sales = StoredNode::new("1");
        sales.dept = Some("Sales".to_string());
        let mut ops = StoredNode::new("2");
        ops.dept = Some("Ops".to_string());

        assert_eq!(store.upsert_nodes(vec![sales, ops]).await?, 2);
        assert_eq!(store.list_nodes(None).await?.len(), 2);
        assert_eq!(store.list_nodes(Some("Sales")).await?.len(), 1);
        assert_eq!(store.node_ids().await?, vec!["1", "2"]);

        let removed = store
            .delete_nodes(&["1".to_string(), "ghost".to_string()])
            .await?;
        assert_eq!(removed, 1);
        assert_eq!(store.node_ids().await?, vec!["2"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_id() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let mut first = StoredNode::new("1");
        first.name = "Old".to_string();
        store.upsert_nodes(vec![first]).await?;

        let mut second = StoredNode::new("1");
        second.name = "New".to_string();
        store.upsert_nodes(vec![second]).await?;

        let nodes = store.list_nodes(None).await?;
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "New");
        Ok(())
    }

    #[tokio::test]
    async fn test_roster_lookups() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let mut row = RosterRow::new("7");
        row.dept = Some("Sales".to_string());
        store.seed_roster(vec![row, RosterRow::new("8")]).await;

        assert!(store.get_roster_row("7").await?.is_some());
        assert!(store.get_roster_row("9").await?.is_none());
        assert_eq!(store.list_roster_rows().await?.len(), 2);
        assert_eq!(store.dept_roster_rows("Sales").await?.len(), 1);

        assert!(store.remove_roster_row("7").await);
        assert!(!store.remove_roster_row("7").await);
        assert!(store.get_roster_row("7").await?.is_none());
        Ok(())
    }
}
