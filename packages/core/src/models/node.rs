//! Chart node domain model for OrgBoard
//!
//! This module defines the core `ChartNode` struct representing one box on an
//! organization chart, plus `StoredNode`, the row shape of the canonical node
//! projection. A chart is a flat ordered list of nodes; hierarchy is expressed
//! through parent references rather than nesting.
//!
//! # Architecture
//!
//! Every node carries two distinct parent references:
//! - `pid` points at the direct manager and drives the reporting tree
//! - `stpid` points at a grouping container (a department box) and expresses
//!   membership rather than reporting
//!
//! At most one of the two is meaningful for positioning at a time, but both
//! fields persist so a node can be moved between the two mechanisms without
//! losing history. `orig_pid` records the parent reference captured when the
//! node was created or synced and is never consulted for live traversal.
//!
//! Tags classify nodes (`group`, `emp`, `Emp_probation`, `headcount_open`)
//! and select the rendering template. Persisted documents sometimes carry
//! tags as a JSON-encoded string rather than an array; deserialization
//! normalizes both encodings so downstream code only ever sees a list.
//!
//! Unknown keys survive a load/save round trip through the `extras` map.
//! Underscore-prefixed keys are runtime-only state and are dropped on save.
//!
//! # Examples
//!
//! ```rust
//! use orgboard_core::models::ChartNode;
//!
//! let dept = ChartNode::group("dept:Sales:100", "Sales").with_pid("100");
//! let emp = ChartNode::new("200")
//!     .with_name("Avery Quinn")
//!     .with_title("Account Manager")
//!     .with_stpid("dept:Sales:100");
//!
//! assert!(dept.is_group());
//! assert!(!emp.is_group());
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Tag marking a grouping container (department/structural) node.
pub const GROUP_TAG: &str = "group";

/// Tag marking a roster-synced employee node.
pub const EMPLOYEE_TAG: &str = "emp";

/// Tag selecting the probation template for recent joiners.
pub const PROBATION_TAG: &str = "Emp_probation";

/// Tag marking an unfilled position.
pub const OPEN_HEADCOUNT_TAG: &str = "headcount_open";

/// Title shown on synthesized department nodes.
pub const DEPARTMENT_TITLE: &str = "Department";

/// One box on the org chart: a person, a department, or a vacant position.
///
/// Field names follow the persisted document layout, so this struct
/// serializes directly into the shape the canvas widget and the profile
/// store exchange. The lenient deserializers tolerate the variations found
/// in real chart documents: numeric ids, tags as a JSON-encoded string,
/// empty-string parent references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartNode {
    /// Unique id within one chart. A real employee identifier, a synthesized
    /// department key, or a client-stamped temporary key.
    #[serde(deserialize_with = "deserialize_text")]
    pub id: String,

    /// Direct reporting edge (person to manager, department to parent).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_reference"
    )]
    pub pid: Option<String>,

    /// Group membership edge (person to department box).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_reference"
    )]
    pub stpid: Option<String>,

    /// Display name.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: String,

    /// Job title or node subtitle.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub title: String,

    /// Resolved display image. Loading falls back across the legacy
    /// `img`/`photo`/`image` aliases; this field holds the winner.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub img: String,

    /// Classification tags, normalized to a list regardless of how the
    /// document encoded them.
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,

    /// Parent reference captured at creation/sync time. Audit trail only,
    /// never used for live traversal.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_reference"
    )]
    pub orig_pid: Option<String>,

    /// Department name.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_text"
    )]
    pub dept: Option<String>,

    /// Business unit.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_text"
    )]
    pub bu: Option<String>,

    /// Staff classification; `"group"` on department nodes.
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_text"
    )]
    pub node_type: Option<String>,

    /// Work location.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_text"
    )]
    pub location: Option<String>,

    /// Free-text description.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub description: String,

    /// Join date in `DD/MM/YYYY` form.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_text"
    )]
    pub joining_date: Option<String>,

    /// Every key this model does not name, carried through load and save.
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl ChartNode {
    /// Create an empty node with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        ChartNode {
            id: id.into(),
            pid: None,
            stpid: None,
            name: String::new(),
            title: String::new(),
            img: String::new(),
            tags: Vec::new(),
            orig_pid: None,
            dept: None,
            bu: None,
            node_type: None,
            location: None,
            description: String::new(),
            joining_date: None,
            extras: Map::new(),
        }
    }

    /// Create a department/group node with the standard group markers set.
    pub fn group(id: impl Into<String>, name: impl Into<String>) -> Self {
        let mut node = ChartNode::new(id);
        node.name = name.into();
        node.title = DEPARTMENT_TITLE.to_string();
        node.node_type = Some(GROUP_TAG.to_string());
        node.tags = vec![GROUP_TAG.to_string()];
        node
    }

    /// Builder: set the direct parent reference.
    pub fn with_pid(mut self, pid: impl Into<String>) -> Self {
        self.pid = Some(pid.into());
        self
    }

    /// Builder: set the group parent reference.
    pub fn with_stpid(mut self, stpid: impl Into<String>) -> Self {
        self.stpid = Some(stpid.into());
        self
    }

    /// Builder: set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder: set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builder: set the display image.
    pub fn with_img(mut self, img: impl Into<String>) -> Self {
        self.img = img.into();
        self
    }

    /// Builder: replace the tag list.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Builder: add one tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Builder: set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether this node is a grouping container.
    pub fn is_group(&self) -> bool {
        self.has_tag(GROUP_TAG)
    }

    /// Whether this node is a vacant position.
    pub fn is_open_headcount(&self) -> bool {
        self.has_tag(OPEN_HEADCOUNT_TAG)
    }

    /// Whether the node carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Normalize one raw record from a persisted chart document.
    ///
    /// Records that are not objects or have a missing/empty `id` are dropped
    /// (returns `None`). When the record has no usable `img`, the legacy
    /// `photo` and `image` aliases are consulted in that order.
    pub fn from_value(raw: Value) -> Option<ChartNode> {
        let mut node: ChartNode = serde_json::from_value(raw).ok()?;
        if node.id.is_empty() {
            return None;
        }
        if node.img.is_empty() {
            node.img = ["photo", "image"]
                .iter()
                .filter_map(|alias| node.extras.get(*alias))
                .filter_map(Value::as_str)
                .find(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_default();
        }
        Some(node)
    }

    /// Serialize for persistence, dropping underscore-prefixed runtime keys.
    ///
    /// Tags always serialize as a list here; parent references that were
    /// normalized away serialize as absent rather than empty strings.
    pub fn to_saved_value(&self) -> Value {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut map)) => {
                map.retain(|key, _| !key.starts_with('_'));
                Value::Object(map)
            }
            Ok(other) => other,
            Err(_) => Value::Null,
        }
    }
}

/// Row shape of the canonical node projection (the `orgchart_nodes` table).
///
/// Unlike [`ChartNode`] this is strict: tags stay JSON-string-encoded exactly
/// as the table stores them and the image column keeps its storage name.
/// Directory queries and Roster Reconciliation exchange this shape; chart
/// documents re-normalize it through [`ChartNode::from_value`] on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNode {
    pub id: String,
    #[serde(default)]
    pub pid: Option<String>,
    #[serde(default)]
    pub stpid: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    /// JSON-encoded tag array, stored as text.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub orig_pid: Option<String>,
    #[serde(default)]
    pub dept: Option<String>,
    #[serde(default)]
    pub bu: Option<String>,
    #[serde(rename = "type", default)]
    pub node_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub joining_date: Option<String>,
}

impl StoredNode {
    /// Create an empty row with the given id and no tags.
    pub fn new(id: impl Into<String>) -> Self {
        StoredNode {
            id: id.into(),
            pid: None,
            stpid: None,
            name: String::new(),
            title: String::new(),
            image: None,
            tags: "[]".to_string(),
            orig_pid: None,
            dept: None,
            bu: None,
            node_type: None,
            location: None,
            description: String::new(),
            joining_date: None,
        }
    }

    /// Decode the stored tag string into a list. Malformed text yields an
    /// empty list rather than an error.
    pub fn tag_list(&self) -> Vec<String> {
        serde_json::from_str(&self.tags).unwrap_or_default()
    }

    /// Whether the stored row represents a grouping container.
    pub fn is_group(&self) -> bool {
        self.tag_list().iter().any(|t| t == GROUP_TAG)
    }
}

/// Partial update applied to one chart node.
///
/// Parent references use a double `Option` to distinguish "leave alone"
/// (`None`) from "explicitly clear" (`Some(None)`) from "set" (`Some(Some)`),
/// so an edit form can detach a node without a dedicated operation. A patch
/// never touches the node's id (renames are a separate operation with their
/// own edge-rewriting rules) or `orig_pid` (audit trail).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub pid: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub stpid: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub dept: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub bu: Option<Option<String>>,

    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub node_type: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub location: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub joining_date: Option<Option<String>>,

    /// Extra keys to merge into the node's `extras` map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Map<String, Value>>,
}

impl NodePatch {
    /// Whether the patch carries no changes at all.
    pub fn is_empty(&self) -> bool {
        *self == NodePatch::default()
    }

    /// Merge this patch into `node`. Empty-string parent references are
    /// normalized to cleared, the same rule loading applies.
    pub fn apply_to(&self, node: &mut ChartNode) {
        if let Some(name) = &self.name {
            node.name = name.clone();
        }
        if let Some(title) = &self.title {
            node.title = title.clone();
        }
        if let Some(img) = &self.img {
            node.img = img.clone();
        }
        if let Some(tags) = &self.tags {
            node.tags = tags.clone();
        }
        if let Some(pid) = &self.pid {
            node.pid = normalize_reference(pid);
        }
        if let Some(stpid) = &self.stpid {
            node.stpid = normalize_reference(stpid);
        }
        if let Some(dept) = &self.dept {
            node.dept = dept.clone();
        }
        if let Some(bu) = &self.bu {
            node.bu = bu.clone();
        }
        if let Some(node_type) = &self.node_type {
            node.node_type = node_type.clone();
        }
        if let Some(location) = &self.location {
            node.location = location.clone();
        }
        if let Some(description) = &self.description {
            node.description = description.clone();
        }
        if let Some(joining_date) = &self.joining_date {
            node.joining_date = joining_date.clone();
        }
        if let Some(extras) = &self.extras {
            for (key, value) in extras {
                node.extras.insert(key.clone(), value.clone());
            }
        }
    }
}

fn normalize_reference(reference: &Option<String>) -> Option<String> {
    reference.as_ref().filter(|s| !s.is_empty()).cloned()
}

/// Helper for deserializing optional fields that distinguishes between
/// missing fields and explicit null values
pub(crate) fn deserialize_optional_field<'de, D, T>(
    deserializer: D,
) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text_of(&value).unwrap_or_default())
}

fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text_of(&value))
}

fn deserialize_reference<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text_of(&value).filter(|s| !s.is_empty()))
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(tag) => Some(tag),
                _ => None,
            })
            .collect(),
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or_default(),
        _ => Vec::new(),
    })
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
