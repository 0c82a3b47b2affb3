use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use super::{
    AbsenceDiff, AbsenceRow, AttendanceStore, ReconcileCommand, ReconcileOutcome, StoreError,
};
use crate::model::attendance::AttendanceRecord;
use crate::model::grade::Grade;
use crate::model::student::Student;
use crate::model::submission::SubmissionReceipt;
use crate::model::teacher::Teacher;
use crate::utils::db_utils::{placeholders, values_rows};

#[derive(Clone)]
pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for MySqlAttendanceStore {
    async fn find_grade(&self, class_id: &str) -> Result<Option<Grade>, StoreError> {
        let grade = sqlx::query_as::<_, Grade>("SELECT id, name FROM grades WHERE id = ?")
            .bind(class_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(grade)
    }

    async fn all_grades(&self) -> Result<Vec<Grade>, StoreError> {
        let grades = sqlx::query_as::<_, Grade>("SELECT id, name FROM grades ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(grades)
    }

    async fn find_teacher(&self, teacher_id: u64) -> Result<Option<Teacher>, StoreError> {
        let teacher = sqlx::query_as::<_, Teacher>("SELECT id, name FROM teachers WHERE id = ?")
            .bind(teacher_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(teacher)
    }

    async fn is_assigned(&self, teacher_id: u64, class_id: &str) -> Result<bool, StoreError> {
        let assigned = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM class_teachers
                WHERE teacher_id = ? AND grade_id = ?
                LIMIT 1
            )
            "#,
        )
        .bind(teacher_id)
        .bind(class_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(assigned > 0)
    }

    async fn class_students(&self, class_id: &str) -> Result<Vec<Student>, StoreError> {
        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, name, grade_id, bus_no, note
            FROM students
            WHERE grade_id = ?
            "#,
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(students)
    }

    async fn enrolled_students(&self) -> Result<Vec<Student>, StoreError> {
        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, name, grade_id, bus_no, note
            FROM students
            WHERE grade_id IS NOT NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(students)
    }

    async fn student_counts(&self) -> Result<HashMap<String, usize>, StoreError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT grade_id, COUNT(*)
            FROM students
            WHERE grade_id IS NOT NULL
            GROUP BY grade_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(grade_id, total)| (grade_id, total.max(0) as usize))
            .collect())
    }

    async fn class_absences(
        &self,
        class_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, student_id, class_id, teacher_id, attendance_date, is_absent, note, created_at
            FROM student_attendance
            WHERE class_id = ? AND attendance_date = ?
            "#,
        )
        .bind(class_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn absences_on(&self, date: NaiveDate) -> Result<Vec<AbsenceRow>, StoreError> {
        let rows = sqlx::query_as::<_, AbsenceRow>(
            r#"
            SELECT
                a.student_id,
                s.name AS student_name,
                a.class_id,
                g.name AS class_name,
                s.bus_no,
                a.note,
                a.teacher_id,
                t.name AS teacher_name,
                a.created_at
            FROM student_attendance a
            JOIN students s ON s.id = a.student_id
            JOIN grades g ON g.id = a.class_id
            LEFT JOIN teachers t ON t.id = a.teacher_id
            WHERE a.attendance_date = ? AND a.is_absent = TRUE
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn receipts_on(&self, date: NaiveDate) -> Result<Vec<SubmissionReceipt>, StoreError> {
        let receipts = sqlx::query_as::<_, SubmissionReceipt>(
            r#"
            SELECT class_id, attendance_date, teacher_id, submitted_at
            FROM attendance_submissions
            WHERE attendance_date = ?
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(receipts)
    }

    async fn find_receipt(
        &self,
        class_id: &str,
        date: NaiveDate,
    ) -> Result<Option<SubmissionReceipt>, StoreError> {
        let receipt = sqlx::query_as::<_, SubmissionReceipt>(
            r#"
            SELECT class_id, attendance_date, teacher_id, submitted_at
            FROM attendance_submissions
            WHERE class_id = ? AND attendance_date = ?
            "#,
        )
        .bind(class_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(receipt)
    }

    async fn apply_reconcile(
        &self,
        command: &ReconcileCommand,
    ) -> Result<ReconcileOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent reconciles of the same class.
        sqlx::query("SELECT id FROM grades WHERE id = ? FOR UPDATE")
            .bind(&command.class_id)
            .execute(&mut *tx)
            .await?;

        let existing: BTreeSet<u64> = sqlx::query_scalar::<_, u64>(
            r#"
            SELECT student_id
            FROM student_attendance
            WHERE class_id = ? AND attendance_date = ?
            FOR UPDATE
            "#,
        )
        .bind(&command.class_id)
        .bind(command.date)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .collect();

        let diff = AbsenceDiff::between(&existing, &command.absent);
        if diff.is_noop() {
            debug!(class_id = %command.class_id, date = %command.date, "Absences unchanged, refreshing receipt");
        } else {
            debug!(
                class_id = %command.class_id,
                date = %command.date,
                insert = diff.to_insert.len(),
                delete = diff.to_delete.len(),
                "Applying attendance diff"
            );
        }

        if !diff.to_delete.is_empty() {
            let sql = format!(
                "DELETE FROM student_attendance WHERE class_id = ? AND attendance_date = ? AND student_id IN ({})",
                placeholders(diff.to_delete.len())
            );
            let mut query = sqlx::query(&sql).bind(&command.class_id).bind(command.date);
            for student_id in &diff.to_delete {
                query = query.bind(*student_id);
            }
            query.execute(&mut *tx).await?;
        }

        if !diff.to_insert.is_empty() {
            // A duplicate (student_id, attendance_date) fails here and rolls back on drop.
            let sql = format!(
                r#"
                INSERT INTO student_attendance
                    (student_id, class_id, teacher_id, attendance_date, is_absent, created_at)
                VALUES {}
                "#,
                values_rows(diff.to_insert.len(), 6)
            );
            let mut query = sqlx::query(&sql);
            for student_id in &diff.to_insert {
                query = query
                    .bind(*student_id)
                    .bind(&command.class_id)
                    .bind(command.teacher_id)
                    .bind(command.date)
                    .bind(true)
                    .bind(command.submitted_at);
            }
            query.execute(&mut *tx).await?;
        }

        sqlx::query(
            r#"
            INSERT INTO attendance_submissions (class_id, attendance_date, teacher_id, submitted_at)
            VALUES (?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                teacher_id = VALUES(teacher_id),
                submitted_at = VALUES(submitted_at)
            "#,
        )
        .bind(&command.class_id)
        .bind(command.date)
        .bind(command.teacher_id)
        .bind(command.submitted_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ReconcileOutcome {
            inserted: diff.to_insert,
            deleted: diff.to_delete,
            unchanged: diff.unchanged,
            receipt: SubmissionReceipt {
                class_id: command.class_id.clone(),
                attendance_date: command.date,
                teacher_id: command.teacher_id,
                submitted_at: command.submitted_at,
            },
        })
    }
}
