//! Chart Controller
//!
//! Translates discrete UI gestures into [`ChartSession`] mutations and owns
//! the load/save cycle against profile storage. One controller edits one
//! chart at a time; the caller owns it explicitly (no ambient singleton)
//! and may swap the loaded profile at will.
//!
//! # Gesture routing
//!
//! Clicks resolve against card hotspots: move arrows reorder siblings, the
//! menu button defers to the widget's own context menu, and a plain card
//! click selects the node for the edit form. Drops delegate to the
//! session's reparenting rules. Canvas-side edits that bypass the typed
//! API (widget-internal add/update/remove callbacks) are recorded through
//! [`ChartController::note_canvas_edit`] so the dirty flag stays honest.
//!
//! # Stale loads
//!
//! Switching profiles while a fetch is in flight must not let the slow
//! fetch clobber the newer chart. Every load claims a [`LoadTicket`];
//! applying a ticket older than the latest claim is a no-op. Callers that
//! drive their own fetches use [`ChartController::begin_load`] and
//! [`ChartController::apply_load`] directly.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::db::{OrgStore, StorageError};
use crate::editor::canvas::{CanvasClick, ClickHotspot};
use crate::editor::error::EditorError;
use crate::editor::session::ChartSession;
use crate::models::{ChartNode, ChartProfile, NodePatch, ProfileUpdate, OPEN_HEADCOUNT_TAG};

/// Fresh-id prefix for placeholder departments
pub const DEPARTMENT_ID_PREFIX: &str = "dept";
/// Fresh-id prefix for placeholder employees
pub const EMPLOYEE_ID_PREFIX: &str = "emp";
/// Fresh-id prefix for placeholder vacancies
pub const VACANT_ID_PREFIX: &str = "vacant";
/// Card image used for vacant positions
pub const VACANT_POSITION_IMAGE: &str = "/headcount_open.png";

/// Load/save failures surfaced to the user.
///
/// On a load failure the previous chart stays displayed; on a save failure
/// the dirty flag stays set so edits are not lost.
#[derive(Error, Debug)]
pub enum ChartIoError {
    #[error("Failed to fetch chart: {detail}")]
    LoadFailed { detail: String },

    #[error("Failed to save chart: {detail}")]
    SaveFailed { detail: String },

    #[error("no chart profile selected")]
    NoProfileSelected,
}

impl ChartIoError {
    fn load_failed(err: StorageError) -> Self {
        ChartIoError::LoadFailed {
            detail: err.detail(),
        }
    }

    fn save_failed(err: StorageError) -> Self {
        ChartIoError::SaveFailed {
            detail: err.detail(),
        }
    }
}

/// Outcome of a chart load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The chart replaced the session content.
    Loaded { count: usize },
    /// The profile does not exist; the caller should clear its selection
    /// and refresh the profile list. Not a failure.
    NotFound,
    /// A newer load claimed the session while this one was in flight; the
    /// fetched content was discarded.
    Superseded,
}

/// Outcome of a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved {
        count: usize,
        saved_at: DateTime<Utc>,
    },
    /// A save was already in flight; this request did nothing.
    AlreadyInFlight,
}

/// What a routed click asks the caller to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// A move arrow was pressed; `moved` reports whether anything changed.
    SiblingMoved { moved: bool },
    /// The menu button was pressed; let the widget open its own menu.
    MenuRequested,
    /// A card was selected; open the edit form on this node.
    Selected(ChartNode),
    /// The click referenced a node the session does not have.
    Ignored,
}

/// Claim on the session's next content replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    profile_id: String,
}

/// Editable chart state for the node edit form.
///
/// `pid`/`stpid` ride along unedited so a form save never re-homes the
/// node. Tags are edited as comma-separated text and split on save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditForm {
    pub id: String,
    pub pid: Option<String>,
    pub stpid: Option<String>,
    pub name: String,
    pub title: String,
    pub img: String,
    pub dept: String,
    pub description: String,
    pub tags: String,
}

impl EditForm {
    /// Pre-populate the form from a node.
    pub fn from_node(node: &ChartNode) -> Self {
        EditForm {
            id: node.id.clone(),
            pid: node.pid.clone(),
            stpid: node.stpid.clone(),
            name: node.name.clone(),
            title: node.title.clone(),
            img: node.img.clone(),
            dept: node.dept.clone().unwrap_or_default(),
            description: node.description.clone(),
            tags: node.tags.join(", "),
        }
    }

    /// Re-key the form to a typed id, auto-filling identity fields when
    /// the id matches a directory entry.
    ///
    /// Fills name/title/image/department from the match, keeping the
    /// previous value wherever the entry's field is blank. Parent fields
    /// are never touched: an identity lookup must not re-home the node.
    pub fn retype_id(&mut self, typed_id: &str, directory: &[ChartNode]) {
        self.id = typed_id.to_string();
        let entry = match directory.iter().find(|node| node.id == typed_id) {
            Some(entry) => entry,
            None => return,
        };
        if !entry.name.is_empty() {
            self.name = entry.name.clone();
        }
        if !entry.title.is_empty() {
            self.title = entry.title.clone();
        }
        if !entry.img.is_empty() {
            self.img = entry.img.clone();
        }
        if let Some(dept) = entry.dept.as_deref() {
            if !dept.is_empty() {
                self.dept = dept.to_string();
            }
        }
    }

    fn tag_list(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn to_patch(&self) -> NodePatch {
        NodePatch {
            name: Some(self.name.clone()),
            title: Some(self.title.clone()),
            img: Some(self.img.clone()),
            description: Some(self.description.clone()),
            tags: Some(self.tag_list()),
            pid: Some(self.pid.clone()),
            stpid: Some(self.stpid.clone()),
            dept: Some(if self.dept.is_empty() {
                None
            } else {
                Some(self.dept.clone())
            }),
            ..Default::default()
        }
    }
}

/// One chart editing surface: session, storage binding, and save state.
pub struct ChartController {
    session: ChartSession,
    store: Arc<dyn OrgStore>,
    active_profile: Option<String>,
    load_generation: u64,
    saving: bool,
    last_save_time: Option<DateTime<Utc>>,
}

impl ChartController {
    pub fn new(store: Arc<dyn OrgStore>) -> Self {
        ChartController {
            session: ChartSession::new(),
            store,
            active_profile: None,
            load_generation: 0,
            saving: false,
            last_save_time: None,
        }
    }

    /// Replace the default session (used to pick a removal policy).
    pub fn with_session(mut self, session: ChartSession) -> Self {
        self.session = session;
        self
    }

    pub fn session(&self) -> &ChartSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ChartSession {
        &mut self.session
    }

    pub fn active_profile(&self) -> Option<&str> {
        self.active_profile.as_deref()
    }

    pub fn last_save_time(&self) -> Option<DateTime<Utc>> {
        self.last_save_time
    }

    //
    // LOAD / SAVE CYCLE
    //

    /// Claim the next content replacement for `profile_id`.
    ///
    /// Any ticket claimed earlier becomes stale: applying it is a no-op.
    pub fn begin_load(&mut self, profile_id: &str) -> LoadTicket {
        self.load_generation += 1;
        LoadTicket {
            generation: self.load_generation,
            profile_id: profile_id.to_string(),
        }
    }

    /// Apply fetched chart documents under a ticket.
    ///
    /// Returns false (and discards the nodes) when a newer load has claimed
    /// the session since the ticket was issued.
    pub fn apply_load(&mut self, ticket: LoadTicket, raw_nodes: Vec<Value>) -> bool {
        if ticket.generation != self.load_generation {
            tracing::debug!(
                profile_id = %ticket.profile_id,
                "Discarding stale chart fetch"
            );
            return false;
        }
        self.session.load(raw_nodes);
        self.active_profile = Some(ticket.profile_id);
        true
    }

    /// Fetch a profile and load its chart into the session.
    ///
    /// A missing profile is reported as [`LoadOutcome::NotFound`], not an
    /// error. On any failure the session keeps its current content.
    pub async fn load_chart(&mut self, profile_id: &str) -> Result<LoadOutcome, ChartIoError> {
        let ticket = self.begin_load(profile_id);
        match self.store.get_profile(profile_id).await {
            Ok(Some(profile)) => {
                let raw_nodes = profile.nodes().to_vec();
                if self.apply_load(ticket, raw_nodes) {
                    Ok(LoadOutcome::Loaded {
                        count: self.session.len(),
                    })
                } else {
                    Ok(LoadOutcome::Superseded)
                }
            }
            Ok(None) => {
                tracing::warn!(%profile_id, "Orgchart not found");
                Ok(LoadOutcome::NotFound)
            }
            Err(StorageError::ProfileNotFound { .. }) => Ok(LoadOutcome::NotFound),
            Err(err) => Err(ChartIoError::load_failed(err)),
        }
    }

    /// Persist the session's chart to the active profile.
    ///
    /// Serializes `getAll` order with internal placeholders excluded, PUTs
    /// the document, and on success records the save time and clears the
    /// dirty flag. On failure the dirty flag stays set.
    pub async fn save_chart(&mut self) -> Result<SaveOutcome, ChartIoError> {
        let profile_id = match self.active_profile.clone() {
            Some(id) => id,
            None => return Err(ChartIoError::NoProfileSelected),
        };
        if self.saving {
            return Ok(SaveOutcome::AlreadyInFlight);
        }
        let nodes = self.session.saved_nodes();
        let count = nodes.len();
        let update = ProfileUpdate::with_org_data(ChartProfile::wrap_nodes(nodes));

        self.saving = true;
        let result = self.store.update_profile(&profile_id, update).await;
        self.saving = false;

        match result {
            Ok(_) => {
                let saved_at = Utc::now();
                self.last_save_time = Some(saved_at);
                self.session.mark_clean();
                tracing::info!(%profile_id, count, "Chart saved");
                Ok(SaveOutcome::Saved { count, saved_at })
            }
            Err(err) => Err(ChartIoError::save_failed(err)),
        }
    }

    //
    // GESTURES
    //

    /// Route a canvas click to the right action.
    pub fn handle_click(&mut self, click: CanvasClick) -> ClickOutcome {
        match click.hotspot {
            ClickHotspot::MoveButton(direction) => ClickOutcome::SiblingMoved {
                moved: self.session.move_sibling(&click.node_id, direction),
            },
            ClickHotspot::MenuButton => ClickOutcome::MenuRequested,
            ClickHotspot::Card => match self.session.get(&click.node_id) {
                Some(node) => ClickOutcome::Selected(node.clone()),
                None => ClickOutcome::Ignored,
            },
        }
    }

    /// Route a completed drag-and-drop. Returns whether the chart changed.
    pub fn handle_drop(&mut self, dragged_id: &str, target_id: &str) -> bool {
        self.session.reparent_via_drop(dragged_id, target_id)
    }

    /// Record a widget-side edit that bypassed the typed mutation API.
    pub fn note_canvas_edit(&mut self) {
        self.session.mark_dirty();
    }

    //
    // MENU ACTIONS
    //

    /// Add a placeholder department under `pid` (None for root).
    pub fn add_department(&mut self, pid: Option<&str>) -> Result<String, EditorError> {
        let id = self.fresh_node_id(DEPARTMENT_ID_PREFIX);
        let mut node = ChartNode::group(&id, "New Department");
        node.pid = pid.map(str::to_string);
        node.orig_pid = pid.map(str::to_string);
        self.session.add_node(node)?;
        Ok(id)
    }

    /// Add a placeholder employee under `pid` (None for root).
    pub fn add_employee(&mut self, pid: Option<&str>) -> Result<String, EditorError> {
        let id = self.fresh_node_id(EMPLOYEE_ID_PREFIX);
        let mut node = ChartNode::new(&id)
            .with_name("New Employee")
            .with_title("Position");
        node.pid = pid.map(str::to_string);
        node.orig_pid = pid.map(str::to_string);
        self.session.add_node(node)?;
        Ok(id)
    }

    /// Add a vacant position under `pid` (None for root).
    pub fn add_open_headcount(&mut self, pid: Option<&str>) -> Result<String, EditorError> {
        let id = self.fresh_node_id(VACANT_ID_PREFIX);
        let mut node = ChartNode::new(&id)
            .with_name("Vacant Position")
            .with_title("Open Headcount")
            .with_img(VACANT_POSITION_IMAGE)
            .with_tag(OPEN_HEADCOUNT_TAG)
            .with_description("Open headcount position");
        node.pid = pid.map(str::to_string);
        node.orig_pid = pid.map(str::to_string);
        self.session.add_node(node)?;
        Ok(id)
    }

    /// Remove a node from the context menu.
    ///
    /// The session's removal event drives the canvas redraw and any active
    /// search/filter refresh; this method only owns the mutation.
    pub fn remove_node(&mut self, node_id: &str) -> Result<ChartNode, EditorError> {
        self.session.remove_node(node_id)
    }

    //
    // EDIT FORM
    //

    /// Open the edit form for a node.
    pub fn edit_form(&self, node_id: &str) -> Option<EditForm> {
        self.session.get(node_id).map(EditForm::from_node)
    }

    /// Apply a submitted edit form to the node it was opened on.
    ///
    /// Field updates go in under the original id first; an id change then
    /// renames with full edge rewriting. A duplicate target id is rejected
    /// before anything mutates.
    pub fn apply_edit(&mut self, original_id: &str, form: &EditForm) -> Result<(), EditorError> {
        let new_id = form.id.trim();
        if new_id.is_empty() {
            return Err(EditorError::IdRequired);
        }
        if new_id != original_id && self.session.get(new_id).is_some() {
            return Err(EditorError::duplicate_id(new_id));
        }
        self.session.update_node(original_id, &form.to_patch())?;
        if new_id != original_id {
            self.session.rename_node_id(original_id, new_id)?;
        }
        Ok(())
    }

    /// Generate a `<prefix>_<millis>` id, bumping the stamp on collision.
    fn fresh_node_id(&self, prefix: &str) -> String {
        let mut stamp = Utc::now().timestamp_millis();
        loop {
            let id = format!("{}_{}", prefix, stamp);
            if self.session.get(&id).is_none() {
                return id;
            }
            stamp += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::editor::session::MoveDirection;
    use crate::models::NewProfile;
    use serde_json::json;

    fn controller() -> ChartController {
        ChartController::new(Arc::new(MemoryStore::new()))
    }

    async fn controller_with_profile(nodes: Vec<Value>) -> (ChartController, String) {
        let store = Arc::new(MemoryStore::new());
        let profile = store
            .create_profile(NewProfile {
                username: "avery".to_string(),
                orgchart_name: "Draft".to_string(),
                describe: None,
                org_data: Some(json!({ "data": nodes })),
            })
            .await
            .unwrap();
        (
            ChartController::new(store),
            profile.orgchart_id,
        )
    }

    #[test]
    fn test_add_department_placeholder() {
        let mut ctl = controller();
        let id = ctl.add_department(None).unwrap();
        assert!(id.starts_with("dept_"));
        let node = ctl.session().get(&id).unwrap();
        assert_eq!(node.name, "New Department");
        assert_eq!(node.title, "Department");
        assert!(node.is_group());
        assert_eq!(node.pid, None);
        assert!(ctl.session().is_dirty());
    }

    #[test]
    fn test_add_employee_placeholder_under_parent() {
        let mut ctl = controller();
        ctl.session_mut().load_nodes(vec![ChartNode::new("boss")]);
        let id = ctl.add_employee(Some("boss")).unwrap();
        let node = ctl.session().get(&id).unwrap();
        assert!(id.starts_with("emp_"));
        assert_eq!(node.name, "New Employee");
        assert_eq!(node.title, "Position");
        assert_eq!(node.pid.as_deref(), Some("boss"));
        assert_eq!(node.orig_pid.as_deref(), Some("boss"));
        assert!(node.tags.is_empty());
    }

    #[test]
    fn test_add_open_headcount_placeholder() {
        let mut ctl = controller();
        let id = ctl.add_open_headcount(None).unwrap();
        let node = ctl.session().get(&id).unwrap();
        assert!(id.starts_with("vacant_"));
        assert_eq!(node.name, "Vacant Position");
        assert_eq!(node.title, "Open Headcount");
        assert_eq!(node.img, "/headcount_open.png");
        assert!(node.is_open_headcount());
        assert_eq!(node.description, "Open headcount position");
    }

    #[test]
    fn test_fresh_ids_never_collide() {
        let mut ctl = controller();
        let first = ctl.add_employee(None).unwrap();
        let second = ctl.add_employee(None).unwrap();
        let third = ctl.add_employee(None).unwrap();
        assert_ne!(first, second);
        assert_ne!(second, third);
    }

    #[test]
    fn test_click_routing() {
        let mut ctl = controller();
        ctl.session_mut().load_nodes(vec![
            ChartNode::new("root"),
            ChartNode::new("a").with_pid("root"),
            ChartNode::new("b").with_pid("root"),
        ]);

        let outcome = ctl.handle_click(CanvasClick::move_button("b", MoveDirection::Left));
        assert_eq!(outcome, ClickOutcome::SiblingMoved { moved: true });

        let outcome = ctl.handle_click(CanvasClick::menu_button("a"));
        assert_eq!(outcome, ClickOutcome::MenuRequested);

        let outcome = ctl.handle_click(CanvasClick::card("a"));
        match outcome {
            ClickOutcome::Selected(node) => assert_eq!(node.id, "a"),
            other => panic!("expected selection, got {:?}", other),
        }

        let outcome = ctl.handle_click(CanvasClick::card("ghost"));
        assert_eq!(outcome, ClickOutcome::Ignored);
    }

    #[test]
    fn test_edit_form_round_trip_same_id() {
        let mut ctl = controller();
        ctl.session_mut().load_nodes(vec![
            ChartNode::new("boss"),
            ChartNode::new("7")
                .with_pid("boss")
                .with_name("Old Name")
                .with_tags(vec!["emp".to_string()]),
        ]);

        let mut form = ctl.edit_form("7").unwrap();
        assert_eq!(form.tags, "emp");
        form.name = "New Name".to_string();
        ctl.apply_edit("7", &form).unwrap();

        let node = ctl.session().get("7").unwrap();
        assert_eq!(node.name, "New Name");
        assert_eq!(node.pid.as_deref(), Some("boss"));
        assert_eq!(node.tags, vec!["emp"]);
    }

    #[test]
    fn test_edit_form_id_change_renames_after_update() {
        let mut ctl = controller();
        ctl.session_mut().load_nodes(vec![
            ChartNode::new("7").with_name("Person"),
            ChartNode::new("child").with_pid("7"),
        ]);

        let mut form = ctl.edit_form("7").unwrap();
        form.id = "0042".to_string();
        form.title = "Lead".to_string();
        ctl.apply_edit("7", &form).unwrap();

        assert!(ctl.session().get("7").is_none());
        let renamed = ctl.session().get("0042").unwrap();
        assert_eq!(renamed.title, "Lead");
        assert_eq!(
            ctl.session().get("child").unwrap().pid.as_deref(),
            Some("0042")
        );
    }

    #[test]
    fn test_edit_form_duplicate_id_rejected_pre_mutation() {
        let mut ctl = controller();
        ctl.session_mut().load_nodes(vec![
            ChartNode::new("7").with_name("Seven"),
            ChartNode::new("8").with_name("Eight"),
        ]);

        let mut form = ctl.edit_form("7").unwrap();
        form.id = "8".to_string();
        form.name = "Changed".to_string();
        let result = ctl.apply_edit("7", &form);
        assert_eq!(result, Err(EditorError::duplicate_id("8")));
        // Nothing mutated, not even the non-id fields.
        assert_eq!(ctl.session().get("7").unwrap().name, "Seven");
    }

    #[test]
    fn test_edit_form_blank_id_rejected() {
        let mut ctl = controller();
        ctl.session_mut().load_nodes(vec![ChartNode::new("7")]);
        let mut form = ctl.edit_form("7").unwrap();
        form.id = "   ".to_string();
        assert_eq!(ctl.apply_edit("7", &form), Err(EditorError::IdRequired));
    }

    #[test]
    fn test_retype_id_fills_identity_fields_only() {
        let directory = vec![ChartNode::new("100")
            .with_name("Dana Reyes")
            .with_title("Manager")
            .with_img("https://img/100.jpg")];
        let mut form = EditForm {
            id: "emp_1".to_string(),
            pid: Some("boss".to_string()),
            stpid: Some("dept:Sales:1".to_string()),
            name: "New Employee".to_string(),
            ..Default::default()
        };

        form.retype_id("100", &directory);
        assert_eq!(form.id, "100");
        assert_eq!(form.name, "Dana Reyes");
        assert_eq!(form.title, "Manager");
        assert_eq!(form.img, "https://img/100.jpg");
        // Parent references are untouched.
        assert_eq!(form.pid.as_deref(), Some("boss"));
        assert_eq!(form.stpid.as_deref(), Some("dept:Sales:1"));
    }

    #[test]
    fn test_retype_id_without_match_keeps_fields() {
        let mut form = EditForm {
            id: "7".to_string(),
            name: "Kept".to_string(),
            ..Default::default()
        };
        form.retype_id("unknown", &[]);
        assert_eq!(form.id, "unknown");
        assert_eq!(form.name, "Kept");
    }

    #[test]
    fn test_retype_id_blank_entry_fields_keep_previous() {
        let directory = vec![ChartNode::new("100").with_name("Dana Reyes")];
        let mut form = EditForm {
            id: "7".to_string(),
            title: "Existing Title".to_string(),
            img: "existing.jpg".to_string(),
            ..Default::default()
        };
        form.retype_id("100", &directory);
        assert_eq!(form.name, "Dana Reyes");
        assert_eq!(form.title, "Existing Title");
        assert_eq!(form.img, "existing.jpg");
    }

    #[tokio::test]
    async fn test_load_chart_normalizes_and_clears_dirty() {
        let (mut ctl, profile_id) = controller_with_profile(vec![
            json!({"id": "1", "name": "A", "tags": "[\"group\"]"}),
            json!({"id": "2", "pid": "1", "photo": "2.jpg"}),
        ])
        .await;

        let outcome = ctl.load_chart(&profile_id).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded { count: 2 });
        assert!(!ctl.session().is_dirty());
        assert_eq!(ctl.active_profile(), Some(profile_id.as_str()));
        assert_eq!(ctl.session().get("2").unwrap().img, "2.jpg");
    }

    #[tokio::test]
    async fn test_load_chart_not_found_keeps_previous_chart() {
        let (mut ctl, profile_id) = controller_with_profile(vec![json!({"id": "1"})]).await;
        ctl.load_chart(&profile_id).await.unwrap();

        let outcome = ctl.load_chart("missing-profile").await.unwrap();
        assert_eq!(outcome, LoadOutcome::NotFound);
        // Prior chart still displayed, prior selection kept.
        assert_eq!(ctl.session().len(), 1);
        assert_eq!(ctl.active_profile(), Some(profile_id.as_str()));
    }

    #[tokio::test]
    async fn test_stale_fetch_discarded() {
        let (mut ctl, _) = controller_with_profile(vec![]).await;

        let stale = ctl.begin_load("first");
        let fresh = ctl.begin_load("second");

        assert!(ctl.apply_load(fresh, vec![json!({"id": "new"})]));
        assert!(!ctl.apply_load(stale, vec![json!({"id": "old"})]));
        assert!(ctl.session().get("new").is_some());
        assert!(ctl.session().get("old").is_none());
        assert_eq!(ctl.active_profile(), Some("second"));
    }

    #[tokio::test]
    async fn test_save_chart_round_trip() {
        let (mut ctl, profile_id) = controller_with_profile(vec![]).await;
        ctl.load_chart(&profile_id).await.unwrap();

        ctl.add_department(None).unwrap();
        let emp_id = ctl.add_employee(None).unwrap();
        assert!(ctl.session().is_dirty());

        let outcome = ctl.save_chart().await.unwrap();
        match outcome {
            SaveOutcome::Saved { count, .. } => assert_eq!(count, 2),
            other => panic!("expected save, got {:?}", other),
        }
        assert!(!ctl.session().is_dirty());
        assert!(ctl.last_save_time().is_some());

        // Reload reproduces the same chart.
        ctl.load_chart(&profile_id).await.unwrap();
        assert_eq!(ctl.session().len(), 2);
        assert!(ctl.session().get(&emp_id).is_some());
    }

    #[tokio::test]
    async fn test_save_skips_internal_placeholder_nodes() {
        let (mut ctl, profile_id) = controller_with_profile(vec![]).await;
        ctl.load_chart(&profile_id).await.unwrap();
        ctl.session_mut()
            .add_node(ChartNode::new("_temp"))
            .unwrap();
        ctl.session_mut().add_node(ChartNode::new("real")).unwrap();

        ctl.save_chart().await.unwrap();
        ctl.load_chart(&profile_id).await.unwrap();
        assert!(ctl.session().get("real").is_some());
        assert!(ctl.session().get("_temp").is_none());
    }

    #[tokio::test]
    async fn test_save_without_profile_fails() {
        let mut ctl = controller();
        let result = ctl.save_chart().await;
        assert!(matches!(result, Err(ChartIoError::NoProfileSelected)));
    }
}
