// src/models/attendance.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Prefix marking the id of a placeholder row that has not been saved yet.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// A row of the `attendance_records` table, or a placeholder for one.
/// Blank times and notes are empty strings.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub employee_id: String,
    pub date: NaiveDate,
    pub present: bool,
    pub start_time: String,
    pub end_time: String,
    pub overtime_hours: f64,
    pub note: String,
}

impl AttendanceRecord {
    /// Placeholder shown for an employee with nothing saved on `date`.
    pub fn placeholder(employee_id: &str, date: NaiveDate) -> Self {
        Self {
            id: format!("{}{}", TEMP_ID_PREFIX, employee_id),
            employee_id: employee_id.to_string(),
            date,
            present: false,
            start_time: String::new(),
            end_time: String::new(),
            overtime_hours: 0.0,
            note: String::new(),
        }
    }

    pub fn is_temporary(&self) -> bool {
        is_temporary_id(&self.id)
    }
}

pub fn is_temporary_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Body of a single-record save. `id` may be absent or a temporary id.
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceInput {
    #[serde(default)]
    pub id: Option<String>,
    pub employee_id: String,
    pub date: NaiveDate,
    pub present: bool,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub overtime_hours: f64,
    #[serde(default)]
    pub note: String,
}

impl From<AttendanceRecord> for AttendanceInput {
    fn from(r: AttendanceRecord) -> Self {
        Self {
            id: Some(r.id),
            employee_id: r.employee_id,
            date: r.date,
            present: r.present,
            start_time: r.start_time,
            end_time: r.end_time,
            overtime_hours: r.overtime_hours,
            note: r.note,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkUpdateType {
    /// Overwrite presence on every row.
    Presence,
    /// Only touch the times of rows already marked present.
    Times,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkPatch {
    pub update_type: BulkUpdateType,
    #[serde(default)]
    pub present: bool,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub overtime_hours: f64,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BulkFailure {
    pub employee_id: String,
    pub error: String,
}

/// Result of persisting a bulk update. Failures do not stop the other rows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkOutcome {
    pub saved: usize,
    pub failed: Vec<BulkFailure>,
}

/// One line of the daily attendance view.
#[derive(Debug, Clone, Serialize)]
pub struct DailyAttendanceRow {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub employee_name: String,
    pub employee_code: String,
    pub persisted: bool,
}

/// Per-employee totals for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub employee_id: String,
    pub employee_code: String,
    pub employee_name: String,
    pub days_present: u32,
    pub days_absent: u32,
    pub overtime_hours: f64,
}
