//! Authorization boundary for attendance operations.
//!
//! Each operation asks exactly one function here and gets back either a
//! [`Grant`] or a `Forbidden` error. Business logic never inspects
//! capabilities itself.

use chrono::NaiveDate;

use crate::error::{AttendanceError, AttendanceResult};
use crate::model::role::CapabilitySet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: u64,
    pub capabilities: CapabilitySet,
    /// Present only if this account is linked to a teacher record
    pub teacher_id: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// Admin or supervisor: any class, any date.
    Privileged,
    /// Teacher acting on an assigned class for today.
    AssignedTeacher { teacher_id: u64 },
}

impl Caller {
    /// Whether the class assignment needs to be looked up before authorizing.
    pub fn needs_assignment_check(&self) -> bool {
        !self.capabilities.is_privileged()
    }
}

pub fn require_privileged(caller: &Caller) -> AttendanceResult<Grant> {
    if caller.capabilities.is_privileged() {
        Ok(Grant::Privileged)
    } else {
        Err(AttendanceError::forbidden("Admin/Supervisor only"))
    }
}

fn own_teacher_id(caller: &Caller) -> AttendanceResult<u64> {
    if !caller.capabilities.is_teacher() {
        return Err(AttendanceError::forbidden(
            "attendance requires the teacher, supervisor or admin capability",
        ));
    }
    caller
        .teacher_id
        .ok_or_else(|| AttendanceError::forbidden("no teacher profile linked to this account"))
}

pub fn authorize_reconcile(
    caller: &Caller,
    teacher_id: u64,
    date: NaiveDate,
    today: NaiveDate,
    assigned: bool,
) -> AttendanceResult<Grant> {
    if caller.capabilities.is_privileged() {
        return Ok(Grant::Privileged);
    }

    let own = own_teacher_id(caller)?;
    if teacher_id != own {
        return Err(AttendanceError::forbidden(
            "teachers may only record attendance as themselves",
        ));
    }
    if date > today {
        return Err(AttendanceError::forbidden(
            "attendance cannot be recorded for a future date",
        ));
    }
    if date < today {
        return Err(AttendanceError::forbidden(
            "teachers may only record attendance for today",
        ));
    }
    if !assigned {
        return Err(AttendanceError::forbidden(
            "teacher is not assigned to this class",
        ));
    }

    Ok(Grant::AssignedTeacher { teacher_id: own })
}

pub fn authorize_roll_view(caller: &Caller, assigned: bool) -> AttendanceResult<Grant> {
    if caller.capabilities.is_privileged() {
        return Ok(Grant::Privileged);
    }

    let own = own_teacher_id(caller)?;
    if !assigned {
        return Err(AttendanceError::forbidden(
            "teacher is not assigned to this class",
        ));
    }

    Ok(Grant::AssignedTeacher { teacher_id: own })
}
