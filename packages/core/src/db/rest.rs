//! REST-backed Store
//!
//! [`RestStore`] implements [`OrgStore`] against the hosted HTTP facade
//! (the same route shapes `crate::api` exposes, so a dev server and a
//! remote deployment are interchangeable behind the trait).
//!
//! Failure mapping follows the store contract: 404 on a point lookup is
//! `Ok(None)`, any other non-success status becomes
//! [`StorageError::RequestFailed`] carrying the server's parsed `error`
//! field or a truncated body snippet, and a 2xx with an unexpected body is
//! [`StorageError::InvalidResponse`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::db::error::{response_detail, StorageError};
use crate::db::org_store::OrgStore;
use crate::models::{
    ChartProfile, DeleteResult, NewProfile, ProfileSummary, ProfileUpdate, RosterRow, StoredNode,
};

/// Per-request timeout
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTP implementation of [`OrgStore`].
pub struct RestStore {
    http: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ProfileListBody {
    #[serde(default)]
    orgcharts: Vec<ProfileSummary>,
}

#[derive(Deserialize)]
struct CreatedBody {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    orgchart_id: String,
}

#[derive(Deserialize)]
struct DirectoryBody {
    #[serde(default)]
    data: Vec<StoredNode>,
}

#[derive(Deserialize)]
struct IdListBody {
    #[serde(default)]
    ids: Vec<String>,
}

#[derive(Deserialize)]
struct UpsertBody {
    #[serde(default)]
    upserted: usize,
}

#[derive(Deserialize)]
struct DeletedBody {
    #[serde(default)]
    deleted: usize,
}

#[derive(Deserialize)]
struct RosterListBody {
    #[serde(default)]
    data: Vec<RosterRow>,
}

#[derive(Deserialize)]
struct RosterSingleBody {
    data: RosterRow,
}

impl RestStore {
    /// Create a store client for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, StorageError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(RestStore {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Consume a failed response into the clearest available error.
    async fn failure(response: reqwest::Response) -> StorageError {
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("");
        let body = response.text().await.unwrap_or_default();
        StorageError::request_failed(
            status.as_u16(),
            response_detail(status.as_u16(), reason, &body),
        )
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StorageError> {
        response
            .json::<T>()
            .await
            .map_err(|err| StorageError::invalid_response(err.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, StorageError> {
        let response = self
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }
        Self::parse(response).await
    }
}

#[async_trait]
impl OrgStore for RestStore {
    async fn list_profiles(&self, owner: &str) -> Result<Vec<ProfileSummary>, StorageError> {
        let body: ProfileListBody = self
            .get_json("/api/orgcharts", &[("username", owner)])
            .await?;
        Ok(body.orgcharts)
    }

    async fn get_profile(&self, orgchart_id: &str) -> Result<Option<ChartProfile>, StorageError> {
        let response = self
            .http
            .get(self.url(&format!("/api/orgcharts/{}", orgchart_id)))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }
        let profile = Self::parse(response).await?;
        Ok(Some(profile))
    }

    async fn create_profile(&self, profile: NewProfile) -> Result<ChartProfile, StorageError> {
        let response = self
            .http
            .post(self.url("/api/orgcharts"))
            .json(&profile)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }
        let created: CreatedBody = Self::parse(response).await?;
        if !created.success || created.orgchart_id.is_empty() {
            return Err(StorageError::invalid_response(
                "create response missing orgchart_id",
            ));
        }
        // The create response carries only the id; fetch the stored record.
        match self.get_profile(&created.orgchart_id).await? {
            Some(profile) => Ok(profile),
            None => Err(StorageError::invalid_response(
                "created profile not readable back",
            )),
        }
    }

    async fn update_profile(
        &self,
        orgchart_id: &str,
        update: ProfileUpdate,
    ) -> Result<ChartProfile, StorageError> {
        let response = self
            .http
            .put(self.url(&format!("/api/orgcharts/{}", orgchart_id)))
            .json(&update)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StorageError::profile_not_found(orgchart_id));
        }
        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }
        match self.get_profile(orgchart_id).await? {
            Some(profile) => Ok(profile),
            None => Err(StorageError::profile_not_found(orgchart_id)),
        }
    }

    async fn delete_profile(&self, orgchart_id: &str) -> Result<DeleteResult, StorageError> {
        if self.get_profile(orgchart_id).await?.is_none() {
            return Ok(DeleteResult::not_found());
        }
        let response = self
            .http
            .delete(self.url(&format!("/api/orgcharts/{}", orgchart_id)))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }
        Ok(DeleteResult::existed())
    }

    async fn list_nodes(&self, dept: Option<&str>) -> Result<Vec<StoredNode>, StorageError> {
        let query: Vec<(&str, &str)> = match dept {
            Some(dept) => vec![("dept", dept)],
            None => Vec::new(),
        };
        let body: DirectoryBody = self.get_json("/api/directory", &query).await?;
        Ok(body.data)
    }

    async fn node_ids(&self) -> Result<Vec<String>, StorageError> {
        let body: IdListBody = self.get_json("/api/directory/ids", &[]).await?;
        Ok(body.ids)
    }

    async fn upsert_nodes(&self, nodes: Vec<StoredNode>) -> Result<usize, StorageError> {
        let response = self
            .http
            .put(self.url("/api/directory"))
            .json(&json!({ "nodes": nodes }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }
        let body: UpsertBody = Self::parse(response).await?;
        Ok(body.upserted)
    }

    async fn delete_nodes(&self, ids: &[String]) -> Result<usize, StorageError> {
        let response = self
            .http
            .delete(self.url("/api/directory"))
            .json(&json!({ "ids": ids }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }
        let body: DeletedBody = Self::parse(response).await?;
        Ok(body.deleted)
    }

    async fn get_roster_row(&self, employee_id: &str) -> Result<Option<RosterRow>, StorageError> {
        let response = self
            .http
            .get(self.url(&format!("/api/employees/{}", employee_id)))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }
        let body: RosterSingleBody = Self::parse(response).await?;
        Ok(Some(body.data))
    }

    async fn list_roster_rows(&self) -> Result<Vec<RosterRow>, StorageError> {
        let body: RosterListBody = self.get_json("/api/employees", &[]).await?;
        Ok(body.data)
    }

    async fn dept_roster_rows(&self, dept: &str) -> Result<Vec<RosterRow>, StorageError> {
        let body: RosterListBody = self.get_json("/api/employees", &[("dept", dept)]).await?;
        Ok(body.data)
    }
}
