use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::attendance::AttendanceStatus;
use crate::model::student::Transport;

/// `part / whole * 100` rounded to one decimal; 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let raw = part as f64 / whole as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AbsenceEntry {
    #[schema(example = 1001)]
    pub student_id: u64,
    #[schema(example = "Sara Ali")]
    pub student_name: String,
    #[schema(example = "G5-A")]
    pub class_id: String,
    #[schema(example = "Grade 5 A")]
    pub class_name: String,
    pub transport: Transport,
    #[schema(nullable = true)]
    pub note: Option<String>,
    /// Teacher the absence was recorded under
    #[schema(example = 7, nullable = true)]
    pub recorded_by_id: Option<u64>,
    #[schema(example = "Ms. Rahma", nullable = true)]
    pub recorded_by: Option<String>,
    #[schema(example = "2026-01-01T08:15:00", value_type = Option<String>, nullable = true)]
    pub recorded_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ClassRef {
    #[schema(example = "G5-B")]
    pub id: String,
    #[schema(example = "Grade 5 B")]
    pub name: String,
}

/// Compiled daily attendance report. Rendering happens elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyReport {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub absences: Vec<AbsenceEntry>,
    /// Trackable classes without a submission receipt for the date
    pub pending_classes: Vec<ClassRef>,
    #[schema(example = 3)]
    pub submitted_classes: usize,
    #[schema(example = 10)]
    pub trackable_classes: usize,
    #[schema(example = 30.0)]
    pub completion_percentage: f64,
}

impl DailyReport {
    pub fn total_absent(&self) -> usize {
        self.absences.len()
    }

    pub fn all_submitted(&self) -> bool {
        self.pending_classes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RollEntry {
    pub student_id: u64,
    pub name: String,
    pub transport: Transport,
    #[schema(nullable = true)]
    pub bus_no: Option<i32>,
    #[schema(nullable = true)]
    pub note: Option<String>,
    pub status: AttendanceStatus,
}

/// The roll-call sheet a teacher fills in for one class and day.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ClassRoll {
    pub class: ClassRef,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub submitted: bool,
    pub students: Vec<RollEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ClassSummary {
    pub class: ClassRef,
    pub total_students: usize,
    pub present: usize,
    pub absent: usize,
    #[schema(example = 92.5)]
    pub attendance_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailySummary {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub classes: Vec<ClassSummary>,
    pub total_students: usize,
    pub total_present: usize,
    pub total_absent: usize,
    pub attendance_percentage: f64,
}

/// One student on the school-wide roster for a day.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RosterEntry {
    #[schema(example = 1001)]
    pub student_id: u64,
    #[schema(example = "Sara Ali")]
    pub student_name: String,
    #[schema(example = "G5-A")]
    pub class_id: String,
    #[schema(example = "Grade 5 A")]
    pub class_name: String,
    pub transport: Transport,
    pub status: AttendanceStatus,
    /// Standing note on the student
    #[schema(nullable = true)]
    pub student_note: Option<String>,
    /// Note attached to the day's absence
    #[schema(nullable = true)]
    pub attendance_note: Option<String>,
    #[schema(example = 7, nullable = true)]
    pub recorded_by_id: Option<u64>,
    #[schema(example = "Ms. Rahma", nullable = true)]
    pub recorded_by: Option<String>,
    #[schema(example = "2026-01-01T08:15:00", value_type = Option<String>, nullable = true)]
    pub recorded_at: Option<NaiveDateTime>,
}

/// Every student of the trackable classes with their status for a day.
///
/// `present` and `absent` count the class selection before the status filter
/// is applied, so an absent-only roster still reports how many were present.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyRoster {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub entries: Vec<RosterEntry>,
    pub present: usize,
    pub absent: usize,
}
