//! Chart Editing Session
//!
//! In-memory working copy of one chart's node list, with the mutation API
//! the interaction layer drives: add, patch, rename (with referential
//! rewrite), remove, sibling reorder, and drop reparenting.
//!
//! # Architecture
//!
//! The session owns a `Vec<ChartNode>` in canvas order. Order is load-bearing:
//! the renderer lays out same-parent nodes in list order, and `move_sibling`
//! reorders by swapping exactly two positions. Every successful mutation sets
//! the dirty flag; loading a chart or confirming a save clears it.
//!
//! Mutations publish [`EditorEvent`]s on a broadcast channel so observers
//! (autosave prompts, activity panes) can react without polling.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::editor::error::EditorError;
use crate::models::ChartNode;

/// Buffer size for the editor event channel
const EDITOR_EVENT_CHANNEL_CAPACITY: usize = 128;

/// Direction for sibling reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Left,
    Right,
}

/// What happens to a removed node's children.
///
/// The default keeps children in place with their parent references intact,
/// so re-adding a node under the same id restores the subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemovalPolicy {
    /// Children keep their (now dangling) references to the removed id.
    #[default]
    Detach,
    /// Children inherit the removed node's own parent references.
    PromoteChildren,
}

/// Events published by chart session mutations
#[derive(Debug, Clone)]
pub enum EditorEvent {
    ChartLoaded { count: usize },
    NodeAdded(ChartNode),
    NodeUpdated(ChartNode),
    NodeRemoved { id: String },
    NodeRenamed { old_id: String, new_id: String },
    SiblingMoved { id: String, direction: MoveDirection },
    NodeReparented { id: String, target_id: String },
}

impl EditorEvent {
    /// Get a string identifier for the event type
    #[allow(dead_code)]
    pub fn event_type(&self) -> &str {
        match self {
            EditorEvent::ChartLoaded { .. } => "chart:loaded",
            EditorEvent::NodeAdded(_) => "node:added",
            EditorEvent::NodeUpdated(_) => "node:updated",
            EditorEvent::NodeRemoved { .. } => "node:removed",
            EditorEvent::NodeRenamed { .. } => "node:renamed",
            EditorEvent::SiblingMoved { .. } => "node:moved",
            EditorEvent::NodeReparented { .. } => "node:reparented",
        }
    }
}

/// Employee counts for a subtree, split by vacancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeadcountSummary {
    pub employees: usize,
    pub open_positions: usize,
}

/// One chart's editable node list plus its change-tracking state.
pub struct ChartSession {
    nodes: Vec<ChartNode>,
    dirty: bool,
    removal_policy: RemovalPolicy,
    event_tx: broadcast::Sender<EditorEvent>,
}

impl ChartSession {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EDITOR_EVENT_CHANNEL_CAPACITY);
        ChartSession {
            nodes: Vec::new(),
            dirty: false,
            removal_policy: RemovalPolicy::default(),
            event_tx,
        }
    }

    pub fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.removal_policy = policy;
        self
    }

    /// Subscribe to mutation events from this session
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.event_tx.subscribe()
    }

    /// Replace the working copy with raw chart documents.
    ///
    /// Documents are normalized on the way in: string-encoded tags become
    /// lists, legacy image keys collapse into `img`, and records without an
    /// id are dropped. Returns the number of nodes loaded.
    pub fn load(&mut self, raw_nodes: Vec<Value>) -> usize {
        let nodes = raw_nodes
            .into_iter()
            .filter_map(ChartNode::from_value)
            .collect();
        self.load_nodes(nodes)
    }

    /// Replace the working copy with already-normalized nodes.
    pub fn load_nodes(&mut self, nodes: Vec<ChartNode>) -> usize {
        let count = nodes.len();
        self.nodes = nodes;
        self.dirty = false;
        tracing::debug!("Loaded {} nodes into chart session", count);
        self.emit(EditorEvent::ChartLoaded { count });
        count
    }

    pub fn get(&self, id: &str) -> Option<&ChartNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// All nodes in canvas order.
    pub fn get_all(&self) -> &[ChartNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record an out-of-band edit (canvas-side callbacks that bypass the
    /// typed mutation API still need to flip the unsaved-changes flag).
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clear the unsaved-changes flag after a confirmed save.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Append a node to the chart.
    ///
    /// Fails with [`EditorError::DuplicateId`] if the id is already taken;
    /// nothing changes in that case.
    pub fn add_node(&mut self, node: ChartNode) -> Result<(), EditorError> {
        if self.get(&node.id).is_some() {
            return Err(EditorError::duplicate_id(&node.id));
        }
        self.nodes.push(node.clone());
        self.dirty = true;
        self.emit(EditorEvent::NodeAdded(node));
        Ok(())
    }

    /// Apply a partial update to an existing node.
    ///
    /// Fields absent from the patch keep their current values; in particular
    /// a patch without `pid`/`stpid` never moves the node.
    pub fn update_node(&mut self, id: &str, patch: &crate::models::NodePatch) -> Result<(), EditorError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|node| node.id == id)
            .ok_or_else(|| EditorError::node_not_found(id))?;
        patch.apply_to(node);
        let updated = node.clone();
        self.dirty = true;
        self.emit(EditorEvent::NodeUpdated(updated));
        Ok(())
    }

    /// Change a node's id and rewrite every `pid`/`stpid` reference to it.
    ///
    /// `orig_pid` is deliberately left alone: it records the reporting line
    /// as imported, not the current edit state. Renaming to an id that is
    /// already taken fails before any rewrite happens.
    pub fn rename_node_id(&mut self, old_id: &str, new_id: &str) -> Result<(), EditorError> {
        if old_id == new_id {
            return Ok(());
        }
        if self.get(new_id).is_some() {
            return Err(EditorError::duplicate_id(new_id));
        }
        if self.get(old_id).is_none() {
            return Err(EditorError::node_not_found(old_id));
        }
        for node in &mut self.nodes {
            if node.id == old_id {
                node.id = new_id.to_string();
            }
            if node.pid.as_deref() == Some(old_id) {
                node.pid = Some(new_id.to_string());
            }
            if node.stpid.as_deref() == Some(old_id) {
                node.stpid = Some(new_id.to_string());
            }
        }
        self.dirty = true;
        self.emit(EditorEvent::NodeRenamed {
            old_id: old_id.to_string(),
            new_id: new_id.to_string(),
        });
        Ok(())
    }

    /// Remove a node, returning it.
    ///
    /// Children are handled per the session's [`RemovalPolicy`]. Under
    /// `PromoteChildren`, reporting children inherit the removed node's
    /// `pid` and group members inherit its `stpid`.
    pub fn remove_node(&mut self, id: &str) -> Result<ChartNode, EditorError> {
        let index = self
            .nodes
            .iter()
            .position(|node| node.id == id)
            .ok_or_else(|| EditorError::node_not_found(id))?;
        let removed = self.nodes.remove(index);
        if self.removal_policy == RemovalPolicy::PromoteChildren {
            for node in &mut self.nodes {
                if node.pid.as_deref() == Some(id) {
                    node.pid = removed.pid.clone();
                }
                if node.stpid.as_deref() == Some(id) {
                    node.stpid = removed.stpid.clone();
                }
            }
        }
        self.dirty = true;
        self.emit(EditorEvent::NodeRemoved { id: id.to_string() });
        Ok(removed)
    }

    /// Swap a node with its neighbor among same-parent siblings.
    ///
    /// Siblings are the nodes whose `pid` AND `stpid` both match; the swap
    /// exchanges exactly two positions in the main list and touches nothing
    /// else. Returns false (and stays clean) when the node is missing or
    /// already at the edge in that direction.
    pub fn move_sibling(&mut self, id: &str, direction: MoveDirection) -> bool {
        let node_index = match self.nodes.iter().position(|node| node.id == id) {
            Some(index) => index,
            None => return false,
        };
        let pid = self.nodes[node_index].pid.clone();
        let stpid = self.nodes[node_index].stpid.clone();

        let sibling_indices: Vec<usize> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.pid == pid && node.stpid == stpid)
            .map(|(index, _)| index)
            .collect();
        let position = match sibling_indices.iter().position(|&index| index == node_index) {
            Some(position) => position,
            None => return false,
        };
        let target_position = match direction {
            MoveDirection::Left => match position.checked_sub(1) {
                Some(previous) => previous,
                None => return false,
            },
            MoveDirection::Right => {
                if position + 1 >= sibling_indices.len() {
                    return false;
                }
                position + 1
            }
        };
        let target_index = sibling_indices[target_position];
        self.nodes.swap(node_index, target_index);
        self.dirty = true;
        self.emit(EditorEvent::SiblingMoved {
            id: id.to_string(),
            direction,
        });
        true
    }

    /// Reparent a node after a drag-and-drop gesture.
    ///
    /// Dropping onto a group makes the node a member (`stpid` set, `pid`
    /// cleared); dropping onto anything else makes it a report (`pid` set,
    /// `stpid` cleared). Self-drops, unknown ids, and drops into the
    /// dragged node's own subtree are ignored. Returns whether the chart
    /// changed.
    pub fn reparent_via_drop(&mut self, dragged_id: &str, target_id: &str) -> bool {
        if dragged_id == target_id {
            return false;
        }
        if self.get(dragged_id).is_none() {
            return false;
        }
        let target_is_group = match self.get(target_id) {
            Some(target) => target.is_group(),
            None => return false,
        };
        if self.subtree_ids(dragged_id).contains(target_id) {
            return false;
        }
        let dragged = match self.nodes.iter_mut().find(|node| node.id == dragged_id) {
            Some(node) => node,
            None => return false,
        };
        if target_is_group {
            dragged.stpid = Some(target_id.to_string());
            dragged.pid = None;
        } else {
            dragged.pid = Some(target_id.to_string());
            dragged.stpid = None;
        }
        self.dirty = true;
        self.emit(EditorEvent::NodeReparented {
            id: dragged_id.to_string(),
            target_id: target_id.to_string(),
        });
        true
    }

    /// Count people in a subtree, splitting filled roles from open ones.
    ///
    /// Walks both reporting (`pid`) and membership (`stpid`) edges. Group
    /// containers themselves are structural and never counted.
    pub fn headcount(&self, root_id: &str) -> HeadcountSummary {
        let mut summary = HeadcountSummary::default();
        let mut seen = HashSet::new();
        seen.insert(root_id.to_string());
        let mut stack = self.children_of(root_id);
        while let Some(id) = stack.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(node) = self.get(&id) {
                if node.is_open_headcount() {
                    summary.open_positions += 1;
                } else if !node.is_group() {
                    summary.employees += 1;
                }
            }
            stack.extend(self.children_of(&id));
        }
        summary
    }

    /// Snapshot the chart as persistence-ready documents.
    ///
    /// Widget-internal placeholder rows (ids starting with `_`) are skipped,
    /// and each node drops its own underscore-prefixed scratch keys.
    pub fn saved_nodes(&self) -> Vec<Value> {
        self.nodes
            .iter()
            .filter(|node| !node.id.starts_with('_'))
            .map(ChartNode::to_saved_value)
            .collect()
    }

    /// Ids of every node reachable from `root_id`, including itself.
    fn subtree_ids(&self, root_id: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let mut stack = vec![root_id.to_string()];
        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            stack.extend(self.children_of(&current));
        }
        seen
    }

    fn children_of(&self, id: &str) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|node| {
                node.pid.as_deref() == Some(id) || node.stpid.as_deref() == Some(id)
            })
            .map(|node| node.id.clone())
            .collect()
    }

    fn emit(&self, event: EditorEvent) {
        // Delivery is best-effort; a session with no subscribers is normal.
        let _ = self.event_tx.send(event);
    }
}

impl Default for ChartSession {
    fn default() -> Self {
        Self::new()
    }
}
