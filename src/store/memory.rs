//! In-memory store used by the test suite. Enforces the same uniqueness and
//! cascade rules as the MySQL schema.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use super::{
    AbsenceDiff, AbsenceRow, AttendanceStore, ReconcileCommand, ReconcileOutcome, StoreError,
};
use crate::model::attendance::AttendanceRecord;
use crate::model::grade::Grade;
use crate::model::student::Student;
use crate::model::submission::SubmissionReceipt;
use crate::model::teacher::Teacher;

#[derive(Default)]
struct State {
    grades: Vec<Grade>,
    students: Vec<Student>,
    teachers: Vec<Teacher>,
    assignments: BTreeSet<(u64, String)>,
    records: Vec<AttendanceRecord>,
    receipts: Vec<SubmissionReceipt>,
    next_id: u64,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_grade(&self, id: &str, name: &str) {
        self.state.lock().unwrap().grades.push(Grade {
            id: id.to_string(),
            name: Some(name.to_string()),
        });
    }

    pub fn add_teacher(&self, id: u64, name: &str) {
        self.state.lock().unwrap().teachers.push(Teacher {
            id,
            name: Some(name.to_string()),
        });
    }

    pub fn assign(&self, teacher_id: u64, class_id: &str) {
        self.state
            .lock()
            .unwrap()
            .assignments
            .insert((teacher_id, class_id.to_string()));
    }

    pub fn add_student(&self, id: u64, name: &str, class_id: &str, bus_no: Option<i32>) {
        self.state.lock().unwrap().students.push(Student {
            id,
            name: Some(name.to_string()),
            grade_id: Some(class_id.to_string()),
            bus_no,
            note: None,
        });
    }

    pub fn move_student(&self, id: u64, class_id: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(s) = state.students.iter_mut().find(|s| s.id == id) {
            s.grade_id = Some(class_id.to_string());
        }
    }

    /// Writes an absence directly, bypassing the recorder.
    pub fn add_absence(&self, student_id: u64, class_id: &str, date: NaiveDate, teacher_id: u64) {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.records.push(AttendanceRecord {
            id,
            student_id,
            class_id: class_id.to_string(),
            teacher_id,
            attendance_date: date,
            is_absent: true,
            note: None,
            created_at: date.and_hms_opt(8, 0, 0).unwrap(),
        });
    }

    pub fn add_receipt(&self, class_id: &str, date: NaiveDate, teacher_id: u64) {
        self.state.lock().unwrap().receipts.push(SubmissionReceipt {
            class_id: class_id.to_string(),
            attendance_date: date,
            teacher_id,
            submitted_at: date.and_hms_opt(8, 30, 0).unwrap(),
        });
    }

    /// Deleting a class cascades to its absences and receipts.
    pub fn remove_grade(&self, class_id: &str) {
        let mut state = self.state.lock().unwrap();
        state.grades.retain(|g| g.id != class_id);
        state.records.retain(|r| r.class_id != class_id);
        state.receipts.retain(|r| r.class_id != class_id);
        state.assignments.retain(|(_, c)| c != class_id);
    }

    /// Deleting a student cascades to their absences.
    pub fn remove_student(&self, student_id: u64) {
        let mut state = self.state.lock().unwrap();
        state.students.retain(|s| s.id != student_id);
        state.records.retain(|r| r.student_id != student_id);
    }

    pub fn records(&self) -> Vec<AttendanceRecord> {
        let mut records = self.state.lock().unwrap().records.clone();
        records.sort_by_key(|r| (r.attendance_date, r.student_id));
        records
    }

    pub fn absent_ids(&self, class_id: &str, date: NaiveDate) -> Vec<u64> {
        self.records()
            .into_iter()
            .filter(|r| r.class_id == class_id && r.attendance_date == date)
            .map(|r| r.student_id)
            .collect()
    }

    pub fn receipt_count(&self) -> usize {
        self.state.lock().unwrap().receipts.len()
    }

    pub fn find_receipt_now(&self, class_id: &str, date: NaiveDate) -> Option<SubmissionReceipt> {
        self.state
            .lock()
            .unwrap()
            .receipts
            .iter()
            .find(|r| r.class_id == class_id && r.attendance_date == date)
            .cloned()
    }
}

fn upsert_receipt(
    receipts: &mut Vec<SubmissionReceipt>,
    class_id: &str,
    date: NaiveDate,
    teacher_id: u64,
    submitted_at: NaiveDateTime,
) -> SubmissionReceipt {
    let receipt = SubmissionReceipt {
        class_id: class_id.to_string(),
        attendance_date: date,
        teacher_id,
        submitted_at,
    };
    match receipts
        .iter_mut()
        .find(|r| r.class_id == class_id && r.attendance_date == date)
    {
        Some(existing) => *existing = receipt.clone(),
        None => receipts.push(receipt.clone()),
    }
    receipt
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn find_grade(&self, class_id: &str) -> Result<Option<Grade>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.grades.iter().find(|g| g.id == class_id).cloned())
    }

    async fn all_grades(&self) -> Result<Vec<Grade>, StoreError> {
        Ok(self.state.lock().unwrap().grades.clone())
    }

    async fn find_teacher(&self, teacher_id: u64) -> Result<Option<Teacher>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.teachers.iter().find(|t| t.id == teacher_id).cloned())
    }

    async fn is_assigned(&self, teacher_id: u64, class_id: &str) -> Result<bool, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .assignments
            .contains(&(teacher_id, class_id.to_string())))
    }

    async fn class_students(&self, class_id: &str) -> Result<Vec<Student>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .students
            .iter()
            .filter(|s| s.grade_id.as_deref() == Some(class_id))
            .cloned()
            .collect())
    }

    async fn enrolled_students(&self) -> Result<Vec<Student>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .students
            .iter()
            .filter(|s| s.grade_id.is_some())
            .cloned()
            .collect())
    }

    async fn student_counts(&self) -> Result<HashMap<String, usize>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut counts = HashMap::new();
        for grade_id in state.students.iter().filter_map(|s| s.grade_id.clone()) {
            *counts.entry(grade_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn class_absences(
        &self,
        class_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .records
            .iter()
            .filter(|r| r.class_id == class_id && r.attendance_date == date)
            .cloned()
            .collect())
    }

    async fn absences_on(&self, date: NaiveDate) -> Result<Vec<AbsenceRow>, StoreError> {
        let state = self.state.lock().unwrap();
        let rows = state
            .records
            .iter()
            .filter(|r| r.attendance_date == date && r.is_absent)
            .filter_map(|r| {
                let student = state.students.iter().find(|s| s.id == r.student_id)?;
                let grade = state.grades.iter().find(|g| g.id == r.class_id)?;
                Some(AbsenceRow {
                    student_id: r.student_id,
                    student_name: student.name.clone(),
                    class_id: r.class_id.clone(),
                    class_name: grade.name.clone(),
                    bus_no: student.bus_no,
                    note: r.note.clone(),
                    teacher_id: r.teacher_id,
                    teacher_name: state
                        .teachers
                        .iter()
                        .find(|t| t.id == r.teacher_id)
                        .and_then(|t| t.name.clone()),
                    created_at: r.created_at,
                })
            })
            .collect();
        Ok(rows)
    }

    async fn receipts_on(&self, date: NaiveDate) -> Result<Vec<SubmissionReceipt>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .receipts
            .iter()
            .filter(|r| r.attendance_date == date)
            .cloned()
            .collect())
    }

    async fn find_receipt(
        &self,
        class_id: &str,
        date: NaiveDate,
    ) -> Result<Option<SubmissionReceipt>, StoreError> {
        Ok(self.find_receipt_now(class_id, date))
    }

    async fn apply_reconcile(
        &self,
        command: &ReconcileCommand,
    ) -> Result<ReconcileOutcome, StoreError> {
        let mut state = self.state.lock().unwrap();

        let existing: BTreeSet<u64> = state
            .records
            .iter()
            .filter(|r| r.class_id == command.class_id && r.attendance_date == command.date)
            .map(|r| r.student_id)
            .collect();
        let diff = AbsenceDiff::between(&existing, &command.absent);

        // UNIQUE (student_id, attendance_date), checked before anything is written
        let clash = diff.to_insert.iter().any(|id| {
            state
                .records
                .iter()
                .any(|r| r.student_id == *id && r.attendance_date == command.date)
        });
        if clash {
            return Err(StoreError::Constraint(
                "student is already recorded absent in another class on this date".to_string(),
            ));
        }

        state.records.retain(|r| {
            !(r.class_id == command.class_id
                && r.attendance_date == command.date
                && diff.to_delete.contains(&r.student_id))
        });
        for student_id in &diff.to_insert {
            state.next_id += 1;
            let id = state.next_id;
            state.records.push(AttendanceRecord {
                id,
                student_id: *student_id,
                class_id: command.class_id.clone(),
                teacher_id: command.teacher_id,
                attendance_date: command.date,
                is_absent: true,
                note: None,
                created_at: command.submitted_at,
            });
        }

        let receipt = upsert_receipt(
            &mut state.receipts,
            &command.class_id,
            command.date,
            command.teacher_id,
            command.submitted_at,
        );

        Ok(ReconcileOutcome {
            inserted: diff.to_insert,
            deleted: diff.to_delete,
            unchanged: diff.unchanged,
            receipt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[test]
    fn deleting_a_class_or_student_cascades() {
        let store = MemoryStore::new();
        store.add_grade("G1", "Grade 1");
        store.add_grade("G2", "Grade 2");
        store.add_student(1, "Ali", "G1", None);
        store.add_student(2, "Bana", "G2", None);
        store.add_absence(1, "G1", day(), 5);
        store.add_absence(2, "G2", day(), 5);
        store.add_receipt("G1", day(), 5);
        store.add_receipt("G2", day(), 5);

        store.remove_grade("G1");
        assert_eq!(store.absent_ids("G1", day()), Vec::<u64>::new());
        assert!(store.find_receipt_now("G1", day()).is_none());
        assert_eq!(store.receipt_count(), 1);

        store.remove_student(2);
        assert!(store.records().is_empty());
    }
}
