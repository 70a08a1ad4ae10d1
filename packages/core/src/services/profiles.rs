//! Chart Profile Management
//!
//! Owner-scoped CRUD over saved chart profiles, plus the department
//! bootstrap flow: a new chart can start pre-filled with a department's
//! directory rows instead of empty. Validation lives here so every API
//! surface (HTTP routes, dev tooling) enforces the same rules.

use std::sync::Arc;

use serde_json::Value;

use crate::db::OrgStore;
use crate::models::{ChartProfile, DeleteResult, NewProfile, ProfileSummary, ProfileUpdate};
use crate::services::error::ProfileError;

/// Profile CRUD and bootstrap operations over an [`OrgStore`].
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn OrgStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn OrgStore>) -> Self {
        ProfileService { store }
    }

    /// List an owner's charts, newest first. A blank owner owns nothing
    /// and never reaches storage.
    pub async fn list(&self, owner: &str) -> Result<Vec<ProfileSummary>, ProfileError> {
        if owner.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.list_profiles(owner).await?)
    }

    /// Create a chart profile. Owner and name are required; description
    /// and chart data default downstream.
    pub async fn create(&self, profile: NewProfile) -> Result<ChartProfile, ProfileError> {
        if !profile.has_required_fields() {
            return Err(ProfileError::MissingFields);
        }
        let created = self.store.create_profile(profile).await?;
        tracing::info!(orgchart_id = %created.orgchart_id, "Created chart profile");
        Ok(created)
    }

    /// Create a chart pre-filled with a department's directory rows.
    ///
    /// An empty department fails with
    /// [`ProfileError::EmptyDepartment`] instead of silently creating a
    /// blank chart; the caller confirms and retries through [`Self::create`]
    /// with no data when a blank chart is really wanted.
    pub async fn create_from_department(
        &self,
        owner: &str,
        name: &str,
        describe: Option<String>,
        dept: &str,
    ) -> Result<ChartProfile, ProfileError> {
        let profile = NewProfile {
            username: owner.to_string(),
            orgchart_name: name.to_string(),
            describe,
            org_data: None,
        };
        if !profile.has_required_fields() {
            return Err(ProfileError::MissingFields);
        }

        let rows = self.store.list_nodes(Some(dept)).await?;
        if rows.is_empty() {
            return Err(ProfileError::empty_department(dept));
        }
        let nodes: Vec<Value> = rows
            .iter()
            .filter_map(|row| serde_json::to_value(row).ok())
            .collect();
        let count = nodes.len();

        let profile = NewProfile {
            org_data: Some(ChartProfile::wrap_nodes(nodes)),
            ..profile
        };
        let created = self.store.create_profile(profile).await?;
        tracing::info!(
            orgchart_id = %created.orgchart_id,
            %dept,
            count,
            "Created chart profile from department"
        );
        Ok(created)
    }

    pub async fn get(&self, orgchart_id: &str) -> Result<Option<ChartProfile>, ProfileError> {
        Ok(self.store.get_profile(orgchart_id).await?)
    }

    pub async fn update(
        &self,
        orgchart_id: &str,
        update: ProfileUpdate,
    ) -> Result<ChartProfile, ProfileError> {
        Ok(self.store.update_profile(orgchart_id, update).await?)
    }

    pub async fn delete(&self, orgchart_id: &str) -> Result<DeleteResult, ProfileError> {
        let result = self.store.delete_profile(orgchart_id).await?;
        tracing::info!(%orgchart_id, existed = result.existed, "Deleted chart profile");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::StoredNode;
    use serde_json::json;

    fn service() -> (ProfileService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (ProfileService::new(store.clone()), store)
    }

    fn dept_row(id: &str, dept: &str) -> StoredNode {
        let mut node = StoredNode::new(id);
        node.dept = Some(dept.to_string());
        node.name = format!("Employee {}", id);
        node
    }

    #[tokio::test]
    async fn test_blank_owner_lists_nothing() -> anyhow::Result<()> {
        let (service, _) = service();
        assert!(service.list("").await?.is_empty());
        assert!(service.list("   ").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_requires_owner_and_name() {
        let (service, _) = service();
        let result = service
            .create(NewProfile {
                username: String::new(),
                orgchart_name: "Draft".to_string(),
                describe: None,
                org_data: None,
            })
            .await;
        assert!(matches!(result, Err(ProfileError::MissingFields)));
    }

    #[tokio::test]
    async fn test_create_and_list() -> anyhow::Result<()> {
        let (service, _) = service();
        let created = service
            .create(NewProfile {
                username: "avery".to_string(),
                orgchart_name: "Draft".to_string(),
                describe: Some("notes".to_string()),
                org_data: None,
            })
            .await?;
        assert_eq!(created.org_data, json!({ "data": [] }));

        let listed = service.list("avery").await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].orgchart_name, "Draft");
        Ok(())
    }

    #[tokio::test]
    async fn test_create_from_department_prefills_chart() -> anyhow::Result<()> {
        let (service, store) = service();
        store
            .seed_directory(vec![
                dept_row("200", "Sales"),
                dept_row("201", "Sales"),
                dept_row("300", "Quality"),
            ])
            .await;

        let created = service
            .create_from_department("avery", "Sales Chart", None, "Sales")
            .await?;

        let nodes = created.nodes();
        assert_eq!(nodes.len(), 2);
        let ids: Vec<&str> = nodes.iter().filter_map(|n| n["id"].as_str()).collect();
        assert_eq!(ids, vec!["200", "201"]);
        // Directory rows keep their storage image key in the document.
        assert!(nodes[0].get("image").is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_from_empty_department_needs_confirmation() -> anyhow::Result<()> {
        let (service, _) = service();
        let result = service
            .create_from_department("avery", "Ghost Chart", None, "Ghost")
            .await;
        match result {
            Err(ProfileError::EmptyDepartment { dept }) => assert_eq!(dept, "Ghost"),
            other => panic!("expected empty department, got {:?}", other.map(|p| p.orgchart_id)),
        }

        // Confirmed path creates the blank chart through plain create.
        let created = service
            .create(NewProfile {
                username: "avery".to_string(),
                orgchart_name: "Ghost Chart".to_string(),
                describe: None,
                org_data: Some(ChartProfile::wrap_nodes(Vec::new())),
            })
            .await?;
        assert_eq!(created.org_data, json!({ "data": [] }));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_reports_existence() -> anyhow::Result<()> {
        let (service, _) = service();
        let created = service
            .create(NewProfile {
                username: "avery".to_string(),
                orgchart_name: "Draft".to_string(),
                describe: None,
                org_data: None,
            })
            .await?;

        assert!(service.delete(&created.orgchart_id).await?.existed);
        assert!(!service.delete(&created.orgchart_id).await?.existed);
        Ok(())
    }
}
