//! Interactive chart editing
//!
//! [`ChartSession`](session::ChartSession) owns the working copy of one
//! chart and its typed mutation API. [`ChartController`](controller::ChartController)
//! sits above the session, translating canvas gestures into mutations and
//! driving the load/save cycle against an [`OrgStore`](crate::db::OrgStore).
//! [`canvas`] holds the widget wiring shared by every rendering host.

mod canvas;
mod controller;
mod error;
mod session;

pub use canvas::{
    CanvasClick, CanvasConfig, ClickHotspot, MenuAction, NodeBinding, CANVAS_TEMPLATE,
    GROUP_TEMPLATE, MENU_ICON_COLOR, MENU_ICON_SIZE, OPEN_HEADCOUNT_TEMPLATE, PROBATION_TEMPLATE,
};
pub use controller::{
    ChartController, ChartIoError, ClickOutcome, EditForm, LoadOutcome, LoadTicket, SaveOutcome,
    DEPARTMENT_ID_PREFIX, EMPLOYEE_ID_PREFIX, VACANT_ID_PREFIX, VACANT_POSITION_IMAGE,
};
pub use error::EditorError;
pub use session::{ChartSession, EditorEvent, HeadcountSummary, MoveDirection, RemovalPolicy};
