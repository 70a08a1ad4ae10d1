//! Employee roster model
//!
//! The roster is the canonical HR record, stored separately from chart
//! nodes. Roster Reconciliation projects these rows into the canonical node
//! table one way; chart profiles may then diverge from that projection.
//!
//! Rows imported from spreadsheets are messy: the manager reference arrives
//! as `"<id>: <name>"` with padded zeros, join dates arrive as Excel serial
//! numbers, ISO timestamps, or already day-first, and some columns only
//! exist inside the raw imported cell map. The helpers here normalize all of
//! that so the projection code works with clean values.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;

// Regex pattern for day-first dates (DD/MM/YYYY, single digits allowed)
const DAY_FIRST_DATE_PATTERN: &str = r"^\d{1,2}/\d{1,2}/\d{4}$";

// Regex pattern for Excel serial numbers stored as text
const DIGIT_SERIAL_PATTERN: &str = r"^\d+$";

/// Raw-cell key holding the manager reference when the dedicated column is
/// blank.
pub const RAW_LINE_MANAGER_KEY: &str = "Line Manager";

/// Raw-cell key holding the join date when the dedicated column is blank.
/// The embedded line break comes from the source sheet's header.
pub const RAW_JOINING_DATE_KEY: &str = "Joining\r\n Date";

/// Probation window in days, measured from the join date.
pub const PROBATION_WINDOW_DAYS: f64 = 60.0;

/// Approval state of a pending line-manager change on a roster row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    None,
    Pending,
    Approved,
    Rejected,
}

/// One canonical HR record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterRow {
    /// Employee identifier; also the id of the projected chart node.
    pub emp_id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub dept: Option<String>,
    #[serde(default)]
    pub bu: Option<String>,
    /// Staff classification (direct/indirect/staff).
    #[serde(default)]
    pub dl_idl_staff: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub employee_type: Option<String>,
    /// Manager reference, free-form `"<id>: <name>"` allowed.
    #[serde(default)]
    pub line_manager: Option<String>,
    /// Join date as imported; see [`RosterRow::formatted_joining_date`].
    #[serde(default)]
    pub joining_date: Option<String>,
    #[serde(default)]
    pub leaving_date: Option<String>,
    /// Original imported cell map, consulted when dedicated columns are
    /// blank.
    #[serde(default)]
    pub raw_data: Option<Map<String, Value>>,
    /// Approval workflow state for a proposed manager change.
    #[serde(default)]
    pub approval_status: ApprovalStatus,
    /// Proposed manager while a change is awaiting approval.
    #[serde(default)]
    pub pending_manager: Option<String>,
    /// Who requested the pending change.
    #[serde(default)]
    pub requested_by: Option<String>,
}

impl RosterRow {
    /// Minimal row for building fixtures; everything optional stays unset.
    pub fn new(emp_id: impl Into<String>) -> Self {
        RosterRow {
            emp_id: emp_id.into(),
            full_name: None,
            job_title: None,
            dept: None,
            bu: None,
            dl_idl_staff: None,
            location: None,
            employee_type: None,
            line_manager: None,
            joining_date: None,
            leaving_date: None,
            raw_data: None,
            approval_status: ApprovalStatus::None,
            pending_manager: None,
            requested_by: None,
        }
    }

    /// The employee id with surrounding whitespace removed. An empty result
    /// means the row cannot be projected.
    pub fn trimmed_emp_id(&self) -> String {
        self.emp_id.trim().to_string()
    }

    /// Department name with a blank fallback, as used inside the department
    /// key.
    pub fn dept_name(&self) -> &str {
        self.dept.as_deref().unwrap_or("")
    }

    /// Resolve the manager id: take the dedicated column, else the raw
    /// imported cell, keep the portion before any `:` delimiter, trim, and
    /// strip leading zeros. All-zero or missing references resolve to
    /// `None`.
    pub fn manager_id(&self) -> Option<String> {
        let raw = self.manager_reference()?;
        trim_leading_zeros(raw.split(':').next().unwrap_or_default().trim())
    }

    /// Department key of the projected group node:
    /// `dept:<deptName>:<managerId>`. A missing manager renders as the
    /// literal `null`, matching the stored keys this projection must keep
    /// matching.
    pub fn department_key(&self) -> String {
        format!(
            "dept:{}:{}",
            self.dept_name(),
            self.manager_id().as_deref().unwrap_or("null")
        )
    }

    /// Join date normalized to `DD/MM/YYYY`, or empty when the row has
    /// none. Falls back to the raw imported cell when the column is blank.
    pub fn formatted_joining_date(&self) -> String {
        if let Some(column) = &self.joining_date {
            if !column.is_empty() {
                return format_joining_date(&Value::String(column.clone()));
            }
        }
        match self
            .raw_data
            .as_ref()
            .and_then(|cells| cells.get(RAW_JOINING_DATE_KEY))
        {
            Some(cell) => format_joining_date(cell),
            None => String::new(),
        }
    }

    // Effective manager reference: dedicated column when non-blank, else the
    // raw imported cell rendered as text.
    fn manager_reference(&self) -> Option<String> {
        if let Some(value) = &self.line_manager {
            if !value.is_empty() {
                return Some(value.clone());
            }
        }
        let cell = self.raw_data.as_ref()?.get(RAW_LINE_MANAGER_KEY)?;
        match cell {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Strip leading zeros from an identifier. Empty and all-zero values (the
/// sheet's way of writing "no manager") resolve to `None`.
pub fn trim_leading_zeros(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    let stripped = value.trim_start_matches('0');
    if stripped.is_empty() {
        return None;
    }
    Some(stripped.to_string())
}

/// Normalize a join date of any imported shape to `DD/MM/YYYY`.
///
/// Accepted shapes, in order:
/// - Excel serial number (numeric, or a digits-only string), counted from
///   1900-01-01
/// - ISO timestamp (anything containing `T`)
/// - already day-first `D/M/YYYY`, passed through unchanged
///
/// Blank input yields an empty string; anything unrecognized is rendered as
/// its plain text.
pub fn format_joining_date(value: &Value) -> String {
    let text = match value {
        Value::Null => return String::new(),
        Value::Bool(false) => return String::new(),
        Value::Bool(true) => return "true".to_string(),
        Value::Number(n) => {
            if n.as_f64() == Some(0.0) {
                return String::new();
            }
            if let Some(serial) = n.as_f64() {
                if serial > 0.0 {
                    if let Some(formatted) = excel_serial_to_day_first(serial) {
                        return formatted;
                    }
                }
            }
            return n.to_string();
        }
        Value::String(s) => {
            if s.is_empty() {
                return String::new();
            }
            s.clone()
        }
        other => return other.to_string(),
    };

    static SERIAL_REGEX: OnceLock<Regex> = OnceLock::new();
    let serial_regex = SERIAL_REGEX.get_or_init(|| Regex::new(DIGIT_SERIAL_PATTERN).unwrap());
    if serial_regex.is_match(&text) {
        if let Ok(serial) = text.parse::<f64>() {
            if serial > 0.0 {
                if let Some(formatted) = excel_serial_to_day_first(serial) {
                    return formatted;
                }
            }
        }
    }

    if text.contains('T') {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&text) {
            return parsed.date_naive().format("%d/%m/%Y").to_string();
        }
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f") {
            return parsed.date().format("%d/%m/%Y").to_string();
        }
        return text;
    }

    static DAY_FIRST_REGEX: OnceLock<Regex> = OnceLock::new();
    let day_first_regex =
        DAY_FIRST_REGEX.get_or_init(|| Regex::new(DAY_FIRST_DATE_PATTERN).unwrap());
    if day_first_regex.is_match(&text) {
        return text;
    }

    text
}

// Serial 1 is 1900-01-01; fractional serials carry a time of day.
fn excel_serial_to_day_first(serial: f64) -> Option<String> {
    let base = NaiveDate::from_ymd_opt(1900, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let offset_ms = ((serial - 1.0) * 86_400_000.0) as i64;
    let moment = base.checked_add_signed(Duration::milliseconds(offset_ms))?;
    Some(moment.date().format("%d/%m/%Y").to_string())
}

/// Whether a `DD/MM/YYYY` join date falls inside the probation window:
/// between zero and [`PROBATION_WINDOW_DAYS`] days before `now`. Future
/// dates and unparseable input are not probation.
pub fn is_probation_period(joining_date: &str, now: DateTime<Utc>) -> bool {
    if joining_date.is_empty() {
        return false;
    }
    let mut parts = joining_date.split('/');
    let (day, month, year) = match (
        parts.next().and_then(|p| p.parse::<u32>().ok()),
        parts.next().and_then(|p| p.parse::<u32>().ok()),
        parts.next().and_then(|p| p.parse::<i32>().ok()),
    ) {
        (Some(day), Some(month), Some(year)) => (day, month, year),
        _ => return false,
    };
    let joined = match NaiveDate::from_ymd_opt(year, month, day).and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        Some(joined) => joined,
        None => return false,
    };
    let diff_days = (now.naive_utc() - joined).num_milliseconds() as f64 / 86_400_000.0;
    (0.0..=PROBATION_WINDOW_DAYS).contains(&diff_days)
}
