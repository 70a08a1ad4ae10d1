//! Chart profile model
//!
//! A chart profile is a named, user-owned snapshot of a node list. Profiles
//! are independent of the canonical roster projection: a user duplicates a
//! department (or starts empty), restructures freely on the canvas, and the
//! edits never leak back into the roster.
//!
//! The node list itself lives inside `org_data`, a schemaless JSON document
//! of the shape `{ "data": [node, ...] }`. It is kept as raw JSON here
//! because stored documents predate the current field set; normalization to
//! [`crate::models::ChartNode`] happens at chart load time.

use super::node::deserialize_optional_field;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A persisted chart profile, as returned by a full fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartProfile {
    /// Storage-assigned unique id.
    pub orgchart_id: String,

    /// Display name, chosen by the owner.
    pub orgchart_name: String,

    /// Free-text description.
    #[serde(default)]
    pub describe: Option<String>,

    /// The node-list document: `{ "data": [node, ...] }`.
    #[serde(default = "ChartProfile::empty_org_data")]
    pub org_data: Value,

    /// Owning user.
    pub username: String,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last save/update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ChartProfile {
    /// The empty node-list document used for brand-new profiles.
    pub fn empty_org_data() -> Value {
        json!({ "data": [] })
    }

    /// Wrap an ordered node list into the document shape profiles store.
    pub fn wrap_nodes(nodes: Vec<Value>) -> Value {
        json!({ "data": nodes })
    }

    /// The raw node list inside `org_data`, or empty when the document is
    /// missing or malformed.
    pub fn nodes(&self) -> &[Value] {
        self.org_data
            .get("data")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Summary view used by profile listings.
    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            orgchart_id: self.orgchart_id.clone(),
            orgchart_name: self.orgchart_name.clone(),
            describe: self.describe.clone(),
            org_data: self.org_data.clone(),
        }
    }
}

/// List-item view of a profile (`GET /api/orgcharts?username=`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub orgchart_id: String,
    pub orgchart_name: String,
    #[serde(default)]
    pub describe: Option<String>,
    #[serde(default = "ChartProfile::empty_org_data")]
    pub org_data: Value,
}

/// Creation request for a new profile.
///
/// `org_data` is optional; a missing document seeds the profile with the
/// empty node list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProfile {
    /// Missing keys deserialize as blank so requests fail the required-field
    /// check instead of being rejected at the parsing layer.
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub orgchart_name: String,
    #[serde(default)]
    pub describe: Option<String>,
    #[serde(default)]
    pub org_data: Option<Value>,
}

impl NewProfile {
    /// Whether the required owner and name fields are present.
    pub fn has_required_fields(&self) -> bool {
        !self.username.trim().is_empty() && !self.orgchart_name.trim().is_empty()
    }
}

/// Partial update for a profile (`PUT /api/orgcharts/{id}`).
///
/// Distinguishes "field not in the request" from "field explicitly null":
/// - `None`: leave the stored value alone
/// - `Some(None)`: explicitly clear it
/// - `Some(Some(v))`: set it to `v`
///
/// The name is plainer: an empty or missing name never overwrites the
/// stored one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orgchart_name: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub describe: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub org_data: Option<Option<Value>>,
}

impl ProfileUpdate {
    /// Update that replaces just the node-list document.
    pub fn with_org_data(org_data: Value) -> Self {
        ProfileUpdate {
            orgchart_name: None,
            describe: None,
            org_data: Some(Some(org_data)),
        }
    }

    /// Whether the update carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.orgchart_name.is_none() && self.describe.is_none() && self.org_data.is_none()
    }
}

/// Result of a delete operation.
///
/// Deleting something that is already gone succeeds; `existed` records
/// whether anything was actually removed, for callers that care.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResult {
    pub existed: bool,
}

impl DeleteResult {
    /// Create a DeleteResult indicating the record existed
    pub fn existed() -> Self {
        Self { existed: true }
    }

    /// Create a DeleteResult indicating the record didn't exist
    pub fn not_found() -> Self {
        Self { existed: false }
    }
}
