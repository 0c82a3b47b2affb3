//! Daily Report Compiler. Pure reads over the store; produces value objects.

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::error::AttendanceResult;
use crate::model::attendance::AttendanceStatus;
use crate::model::grade::Grade;
use crate::model::report::{
    AbsenceEntry, ClassRef, ClassSummary, DailyReport, DailyRoster, DailySummary, RosterEntry,
    percentage,
};
use crate::model::student::{Student, Transport};
use crate::model::submission::SubmissionReceipt;
use crate::store::{AbsenceRow, AttendanceStore};

fn class_ref(grade: &Grade) -> ClassRef {
    ClassRef {
        id: grade.id.clone(),
        name: grade.display_name().to_string(),
    }
}

fn by_name(a: &ClassRef, b: &ClassRef) -> std::cmp::Ordering {
    a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))
}

/// Builds the report from already-loaded rows. `trackable` must hold only
/// trackable classes; absences and receipts of other classes are ignored.
pub fn compile_daily_report(
    date: NaiveDate,
    trackable: &[Grade],
    absences: Vec<AbsenceRow>,
    receipts: &[SubmissionReceipt],
) -> DailyReport {
    let tracked_ids: BTreeSet<&str> = trackable.iter().map(|g| g.id.as_str()).collect();

    let submitted: BTreeSet<&str> = receipts
        .iter()
        .filter(|r| r.attendance_date == date)
        .map(|r| r.class_id.as_str())
        .filter(|id| tracked_ids.contains(id))
        .collect();

    let mut pending_classes: Vec<ClassRef> = trackable
        .iter()
        .filter(|g| !submitted.contains(g.id.as_str()))
        .map(class_ref)
        .collect();
    pending_classes.sort_by(by_name);

    let mut entries: Vec<AbsenceEntry> = absences
        .into_iter()
        .filter(|row| tracked_ids.contains(row.class_id.as_str()))
        .map(|row| AbsenceEntry {
            student_id: row.student_id,
            student_name: row.student_name.unwrap_or_default(),
            class_name: row.class_name.unwrap_or_else(|| row.class_id.clone()),
            class_id: row.class_id,
            transport: Transport::from_bus_no(row.bus_no),
            note: row.note,
            recorded_by_id: Some(row.teacher_id),
            recorded_by: row.teacher_name,
            recorded_at: Some(row.created_at),
        })
        .collect();
    entries.sort_by(|a, b| {
        a.class_name
            .cmp(&b.class_name)
            .then_with(|| a.student_name.cmp(&b.student_name))
            .then_with(|| a.student_id.cmp(&b.student_id))
    });

    DailyReport {
        date,
        absences: entries,
        pending_classes,
        submitted_classes: submitted.len(),
        trackable_classes: trackable.len(),
        completion_percentage: percentage(submitted.len(), trackable.len()),
    }
}

pub fn compile_daily_summary(
    date: NaiveDate,
    trackable: &[Grade],
    student_counts: &HashMap<String, usize>,
    absences: &[AbsenceRow],
) -> DailySummary {
    let mut absent_by_class: HashMap<&str, usize> = HashMap::new();
    for row in absences {
        *absent_by_class.entry(row.class_id.as_str()).or_insert(0) += 1;
    }

    let mut classes: Vec<ClassSummary> = trackable
        .iter()
        .map(|grade| {
            let total = student_counts.get(&grade.id).copied().unwrap_or(0);
            let absent = absent_by_class.get(grade.id.as_str()).copied().unwrap_or(0);
            let present = total.saturating_sub(absent);
            ClassSummary {
                class: class_ref(grade),
                total_students: total,
                present,
                absent,
                attendance_percentage: percentage(present, total),
            }
        })
        .collect();
    classes.sort_by(|a, b| by_name(&a.class, &b.class));

    let total_students = classes.iter().map(|c| c.total_students).sum();
    let total_present = classes.iter().map(|c| c.present).sum();
    let total_absent = classes.iter().map(|c| c.absent).sum();

    DailySummary {
        date,
        classes,
        total_students,
        total_present,
        total_absent,
        attendance_percentage: percentage(total_present, total_students),
    }
}

/// Narrows the roster to one class and/or one status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterFilter {
    pub class_id: Option<String>,
    pub status: Option<AttendanceStatus>,
}

/// Joins every student of the trackable classes with the day's absences.
/// A student without an absence row is present.
pub fn compile_daily_roster(
    date: NaiveDate,
    trackable: &[Grade],
    students: Vec<Student>,
    absences: Vec<AbsenceRow>,
    filter: &RosterFilter,
) -> DailyRoster {
    let grades: HashMap<&str, &Grade> = trackable.iter().map(|g| (g.id.as_str(), g)).collect();
    let mut absent_by_student: HashMap<u64, AbsenceRow> =
        absences.into_iter().map(|row| (row.student_id, row)).collect();

    let mut entries: Vec<RosterEntry> = students
        .into_iter()
        .filter_map(|student| {
            let grade = *grades.get(student.grade_id.as_deref()?)?;
            if filter.class_id.as_ref().is_some_and(|id| *id != grade.id) {
                return None;
            }
            let absence = absent_by_student.remove(&student.id);
            let status = if absence.is_some() {
                AttendanceStatus::Absent
            } else {
                AttendanceStatus::Present
            };
            let transport = student.transport();
            Some(RosterEntry {
                student_id: student.id,
                student_name: student.name.unwrap_or_default(),
                class_id: grade.id.clone(),
                class_name: grade.display_name().to_string(),
                transport,
                status,
                student_note: student.note,
                attendance_note: absence.as_ref().and_then(|a| a.note.clone()),
                recorded_by_id: absence.as_ref().map(|a| a.teacher_id),
                recorded_by: absence.as_ref().and_then(|a| a.teacher_name.clone()),
                recorded_at: absence.as_ref().map(|a| a.created_at),
            })
        })
        .collect();
    entries.sort_by(|a, b| {
        a.class_name
            .cmp(&b.class_name)
            .then_with(|| a.student_name.cmp(&b.student_name))
            .then_with(|| a.student_id.cmp(&b.student_id))
    });

    let absent = entries
        .iter()
        .filter(|e| e.status == AttendanceStatus::Absent)
        .count();
    let present = entries.len() - absent;

    if let Some(status) = filter.status {
        entries.retain(|e| e.status == status);
    }

    DailyRoster {
        date,
        entries,
        present,
        absent,
    }
}

#[derive(Clone)]
pub struct ReportCompiler {
    store: Arc<dyn AttendanceStore>,
}

impl ReportCompiler {
    pub fn new(store: Arc<dyn AttendanceStore>) -> Self {
        Self { store }
    }

    pub async fn daily_report(&self, date: NaiveDate) -> AttendanceResult<DailyReport> {
        let trackable = self.store.trackable_grades().await?;
        let absences = self.store.absences_on(date).await?;
        let receipts = self.store.receipts_on(date).await?;

        Ok(compile_daily_report(date, &trackable, absences, &receipts))
    }

    pub async fn daily_summary(&self, date: NaiveDate) -> AttendanceResult<DailySummary> {
        let trackable = self.store.trackable_grades().await?;
        let counts = self.store.student_counts().await?;
        let absences = self.store.absences_on(date).await?;

        Ok(compile_daily_summary(date, &trackable, &counts, &absences))
    }

    pub async fn daily_roster(
        &self,
        date: NaiveDate,
        filter: &RosterFilter,
    ) -> AttendanceResult<DailyRoster> {
        let trackable = self.store.trackable_grades().await?;
        let students = self.store.enrolled_students().await?;
        let absences = self.store.absences_on(date).await?;

        Ok(compile_daily_roster(date, &trackable, students, absences, filter))
    }
}
