//! Attendance Store boundary.
//!
//! Absence records and submission receipts are owned here. Callers reference
//! classes and students by id only; the schema in `sql/schema.sql` cascades
//! deletes and enforces one absence per (student, date) and one receipt per
//! (class, date).

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;
use utoipa::ToSchema;

use crate::model::attendance::AttendanceRecord;
use crate::model::grade::Grade;
use crate::model::student::Student;
use crate::model::submission::SubmissionReceipt;
use crate::model::teacher::Teacher;
use crate::utils::db_utils::{is_lock_conflict, is_unique_violation};

#[cfg(test)]
pub mod memory;
pub mod mysql;

pub use mysql::MySqlAttendanceStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint or a concurrent writer rejected the write.
    #[error("{0}")]
    Constraint(String),

    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            StoreError::Constraint(
                "student is already recorded absent in another class on this date".to_string(),
            )
        } else if is_lock_conflict(&err) {
            StoreError::Constraint(
                "attendance for this class was written concurrently; retry".to_string(),
            )
        } else {
            StoreError::Database(err)
        }
    }
}

/// An absence joined with the student and class it refers to.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AbsenceRow {
    pub student_id: u64,
    pub student_name: Option<String>,
    pub class_id: String,
    pub class_name: Option<String>,
    pub bus_no: Option<i32>,
    pub note: Option<String>,
    pub teacher_id: u64,
    pub teacher_name: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Set difference between stored and submitted absentees.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AbsenceDiff {
    pub to_insert: Vec<u64>,
    pub to_delete: Vec<u64>,
    pub unchanged: Vec<u64>,
}

impl AbsenceDiff {
    pub fn between(existing: &BTreeSet<u64>, submitted: &BTreeSet<u64>) -> Self {
        Self {
            to_insert: submitted.difference(existing).copied().collect(),
            to_delete: existing.difference(submitted).copied().collect(),
            unchanged: existing.intersection(submitted).copied().collect(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.to_insert.is_empty() && self.to_delete.is_empty()
    }
}

/// The authoritative absent set for one (class, date), ready to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileCommand {
    pub class_id: String,
    pub date: NaiveDate,
    pub teacher_id: u64,
    pub absent: BTreeSet<u64>,
    pub submitted_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReconcileOutcome {
    pub inserted: Vec<u64>,
    pub deleted: Vec<u64>,
    pub unchanged: Vec<u64>,
    pub receipt: SubmissionReceipt,
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find_grade(&self, class_id: &str) -> Result<Option<Grade>, StoreError>;

    async fn all_grades(&self) -> Result<Vec<Grade>, StoreError>;

    async fn trackable_grades(&self) -> Result<Vec<Grade>, StoreError> {
        let grades = self.all_grades().await?;
        Ok(grades.into_iter().filter(Grade::is_trackable).collect())
    }

    async fn find_teacher(&self, teacher_id: u64) -> Result<Option<Teacher>, StoreError>;

    async fn is_assigned(&self, teacher_id: u64, class_id: &str) -> Result<bool, StoreError>;

    async fn class_students(&self, class_id: &str) -> Result<Vec<Student>, StoreError>;

    /// Every student currently placed in a class.
    async fn enrolled_students(&self) -> Result<Vec<Student>, StoreError>;

    /// Enrolled student count keyed by class id.
    async fn student_counts(&self) -> Result<HashMap<String, usize>, StoreError>;

    async fn class_absences(
        &self,
        class_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;

    async fn absences_on(&self, date: NaiveDate) -> Result<Vec<AbsenceRow>, StoreError>;

    async fn receipts_on(&self, date: NaiveDate) -> Result<Vec<SubmissionReceipt>, StoreError>;

    async fn find_receipt(
        &self,
        class_id: &str,
        date: NaiveDate,
    ) -> Result<Option<SubmissionReceipt>, StoreError>;

    /// Runs load-diff-write plus the receipt upsert as one atomic unit.
    async fn apply_reconcile(
        &self,
        command: &ReconcileCommand,
    ) -> Result<ReconcileOutcome, StoreError>;
}
