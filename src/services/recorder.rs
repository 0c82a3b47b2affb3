//! Attendance Recorder: reconciles a submitted absent set for one class and day.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::auth::policy::{self, Caller, Grant};
use crate::error::{AttendanceError, AttendanceResult};
use crate::model::attendance::AttendanceStatus;
use crate::model::grade::Grade;
use crate::model::report::{ClassRef, ClassRoll, RollEntry};
use crate::services::clock::Clock;
use crate::store::{AttendanceStore, ReconcileCommand, ReconcileOutcome};

#[derive(Clone)]
pub struct AttendanceRecorder {
    store: Arc<dyn AttendanceStore>,
    clock: Arc<dyn Clock>,
}

impl AttendanceRecorder {
    pub fn new(store: Arc<dyn AttendanceStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    async fn trackable_grade(&self, class_id: &str) -> AttendanceResult<Grade> {
        let grade = self
            .store
            .find_grade(class_id)
            .await?
            .ok_or_else(|| AttendanceError::not_found(format!("class {class_id}")))?;

        if !grade.is_trackable() {
            return Err(AttendanceError::InvalidInput(format!(
                "class {class_id} is a home-schooling cohort and is not tracked"
            )));
        }
        Ok(grade)
    }

    async fn caller_assigned(&self, caller: &Caller, class_id: &str) -> AttendanceResult<bool> {
        if !caller.needs_assignment_check() {
            return Ok(true);
        }
        match caller.teacher_id {
            Some(teacher_id) => Ok(self.store.is_assigned(teacher_id, class_id).await?),
            None => Ok(false),
        }
    }

    /// Makes the stored absences for (class, date) match `absent_student_ids`
    /// exactly and writes the submission receipt.
    #[instrument(
        name = "reconcile_attendance",
        skip(self, caller, absent_student_ids),
        fields(user_id = caller.user_id, absent = absent_student_ids.len())
    )]
    pub async fn reconcile(
        &self,
        caller: &Caller,
        class_id: &str,
        date: NaiveDate,
        teacher_id: u64,
        absent_student_ids: &[u64],
    ) -> AttendanceResult<ReconcileOutcome> {
        self.trackable_grade(class_id).await?;

        let today = self.clock.today();
        let assigned = self.caller_assigned(caller, class_id).await?;
        policy::authorize_reconcile(caller, teacher_id, date, today, assigned)?;

        if self.store.find_teacher(teacher_id).await?.is_none() {
            return Err(AttendanceError::not_found(format!("teacher {teacher_id}")));
        }

        let absent: BTreeSet<u64> = absent_student_ids.iter().copied().collect();
        let enrolled: BTreeSet<u64> = self
            .store
            .class_students(class_id)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();
        if let Some(stranger) = absent.difference(&enrolled).next() {
            return Err(AttendanceError::not_found(format!(
                "student {stranger} in class {class_id}"
            )));
        }

        let command = ReconcileCommand {
            class_id: class_id.to_string(),
            date,
            teacher_id,
            absent,
            submitted_at: self.clock.now(),
        };

        let outcome = self.store.apply_reconcile(&command).await?;

        info!(
            inserted = outcome.inserted.len(),
            deleted = outcome.deleted.len(),
            unchanged = outcome.unchanged.len(),
            "Attendance saved"
        );

        Ok(outcome)
    }

    /// The roll-call sheet for a class. Teachers always get today's sheet.
    pub async fn class_roll(
        &self,
        caller: &Caller,
        class_id: &str,
        requested: Option<NaiveDate>,
    ) -> AttendanceResult<ClassRoll> {
        let grade = self.trackable_grade(class_id).await?;

        let assigned = self.caller_assigned(caller, class_id).await?;
        let today = self.clock.today();
        let date = match policy::authorize_roll_view(caller, assigned)? {
            Grant::Privileged => requested.unwrap_or(today),
            Grant::AssignedTeacher { .. } => today,
        };

        let records = self.store.class_absences(class_id, date).await?;
        let submitted = self.store.find_receipt(class_id, date).await?.is_some();

        let mut students: Vec<RollEntry> = self
            .store
            .class_students(class_id)
            .await?
            .into_iter()
            .map(|s| {
                let record = records.iter().find(|r| r.student_id == s.id);
                RollEntry {
                    student_id: s.id,
                    name: s.name.clone().unwrap_or_default(),
                    transport: s.transport(),
                    bus_no: s.bus_no,
                    note: s.note.clone(),
                    status: AttendanceStatus::from_record(record),
                }
            })
            .collect();
        students.sort_by(|a, b| a.name.cmp(&b.name).then(a.student_id.cmp(&b.student_id)));

        Ok(ClassRoll {
            class: ClassRef {
                id: grade.id.clone(),
                name: grade.display_name().to_string(),
            },
            date,
            submitted,
            students,
        })
    }
}
