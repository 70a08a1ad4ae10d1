//! Canvas Widget Wiring
//!
//! Typed description of how the rendering widget is configured and how its
//! callbacks are reported back to the editor. The widget itself is an
//! external collaborator; this module owns the contract: which node fields
//! bind to which visual slots, which tag values switch templates, what the
//! context menu offers, and the vocabulary for click and drop callbacks.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::editor::session::MoveDirection;
use crate::models::{GROUP_TAG, OPEN_HEADCOUNT_TAG, PROBATION_TAG};

/// Base template used for ordinary employee cards
pub const CANVAS_TEMPLATE: &str = "big";
/// Template override for group container nodes
pub const GROUP_TEMPLATE: &str = "group";
/// Template override for employees inside the probation window
pub const PROBATION_TEMPLATE: &str = "big_v2";
/// Template override for vacant positions
pub const OPEN_HEADCOUNT_TEMPLATE: &str = "big_hc_open";

/// Menu icon tint shared by every entry
pub const MENU_ICON_COLOR: &str = "#7A7A7A";
/// Menu icon dimensions in pixels
pub const MENU_ICON_SIZE: u32 = 24;

/// Context-menu entries offered on every node card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    AddDepartment,
    AddEmployee,
    AddOpenHeadcount,
    Remove,
}

impl MenuAction {
    /// Key the widget uses to register this entry
    pub fn widget_key(&self) -> &'static str {
        match self {
            MenuAction::AddDepartment => "addDepartment",
            MenuAction::AddEmployee => "addEmployee",
            MenuAction::AddOpenHeadcount => "addHeadcountOpen",
            MenuAction::Remove => "remove",
        }
    }

    /// User-facing menu label
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::AddDepartment => "Add new department",
            MenuAction::AddEmployee => "Add new employee",
            MenuAction::AddOpenHeadcount => "Add Open Headcount",
            MenuAction::Remove => "Remove",
        }
    }

    /// Icon glyph for the entry
    pub fn icon(&self) -> &'static str {
        match self {
            MenuAction::Remove => "remove",
            _ => "add",
        }
    }
}

/// Which node fields populate the card's visual slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeBinding {
    pub field_0: String,
    pub field_1: String,
    pub img_0: String,
}

impl Default for NodeBinding {
    fn default() -> Self {
        NodeBinding {
            field_0: "name".to_string(),
            field_1: "title".to_string(),
            img_0: "img".to_string(),
        }
    }
}

/// Full widget configuration for a chart editing surface.
///
/// The default is the production wiring: drag-and-drop on, the widget's own
/// search box off, node clicks suppressed so the editor's own click routing
/// decides what happens, and template overrides keyed by node tag.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasConfig {
    pub template: String,
    pub enable_drag_drop: bool,
    pub enable_search: bool,
    pub node_binding: NodeBinding,
    pub node_menu: Vec<MenuAction>,
    /// Tag value to template name; nodes carrying the tag render with the
    /// override instead of the base template.
    pub tag_templates: BTreeMap<String, String>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        let mut tag_templates = BTreeMap::new();
        tag_templates.insert(GROUP_TAG.to_string(), GROUP_TEMPLATE.to_string());
        tag_templates.insert(PROBATION_TAG.to_string(), PROBATION_TEMPLATE.to_string());
        tag_templates.insert(
            OPEN_HEADCOUNT_TAG.to_string(),
            OPEN_HEADCOUNT_TEMPLATE.to_string(),
        );
        CanvasConfig {
            template: CANVAS_TEMPLATE.to_string(),
            enable_drag_drop: true,
            enable_search: false,
            node_binding: NodeBinding::default(),
            node_menu: vec![
                MenuAction::AddDepartment,
                MenuAction::AddEmployee,
                MenuAction::AddOpenHeadcount,
                MenuAction::Remove,
            ],
            tag_templates,
        }
    }
}

impl CanvasConfig {
    /// Render the configuration as the widget's initialization document.
    pub fn to_widget_value(&self) -> Value {
        let mut menu = serde_json::Map::new();
        for action in &self.node_menu {
            menu.insert(
                action.widget_key().to_string(),
                json!({
                    "text": action.label(),
                    "icon": action.icon(),
                }),
            );
        }
        let mut tags = serde_json::Map::new();
        for (tag, template) in &self.tag_templates {
            tags.insert(tag.clone(), json!({ "template": template }));
        }
        json!({
            "template": self.template,
            "enableDragDrop": self.enable_drag_drop,
            "enableSearch": self.enable_search,
            "nodeMouseClick": "none",
            "nodeBinding": {
                "field_0": self.node_binding.field_0,
                "field_1": self.node_binding.field_1,
                "img_0": self.node_binding.img_0,
            },
            "nodeMenu": Value::Object(menu),
            "tags": Value::Object(tags),
        })
    }
}

/// A click callback from the widget, resolved to the nearest marked hotspot.
///
/// Cards render two kinds of hotspot above the plain card surface: the
/// per-node move arrows and the three-dot menu button. The widget reports
/// which one (if either) sat under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasClick {
    pub node_id: String,
    pub hotspot: ClickHotspot,
}

/// The hotspot a click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickHotspot {
    /// Plain card surface
    Card,
    /// One of the per-node move arrows
    MoveButton(MoveDirection),
    /// The three-dot menu button
    MenuButton,
}

impl CanvasClick {
    pub fn card(node_id: impl Into<String>) -> Self {
        CanvasClick {
            node_id: node_id.into(),
            hotspot: ClickHotspot::Card,
        }
    }

    pub fn move_button(node_id: impl Into<String>, direction: MoveDirection) -> Self {
        CanvasClick {
            node_id: node_id.into(),
            hotspot: ClickHotspot::MoveButton(direction),
        }
    }

    pub fn menu_button(node_id: impl Into<String>) -> Self {
        CanvasClick {
            node_id: node_id.into(),
            hotspot: ClickHotspot::MenuButton,
        }
    }
}
