use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One absence. Presence is never stored: no row for (student, date) means present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceRecord {
    pub id: u64,
    pub student_id: u64,
    pub class_id: String,
    pub teacher_id: u64,
    pub attendance_date: NaiveDate,
    pub is_absent: bool,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn from_record(record: Option<&AttendanceRecord>) -> Self {
        match record {
            Some(r) if r.is_absent => AttendanceStatus::Absent,
            _ => AttendanceStatus::Present,
        }
    }
}
