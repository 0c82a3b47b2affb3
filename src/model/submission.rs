use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Marks that roll call for a class was completed on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SubmissionReceipt {
    #[schema(example = "G5-A")]
    pub class_id: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub attendance_date: NaiveDate,
    #[schema(example = 12)]
    pub teacher_id: u64,
    #[schema(example = "2026-01-01T08:05:00", format = "date-time", value_type = String)]
    pub submitted_at: NaiveDateTime,
}
