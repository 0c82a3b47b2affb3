use crate::auth::auth::AuthUser;
use crate::error::{AttendanceError, AttendanceResult};
use crate::services::recorder::AttendanceRecorder;
use crate::utils::date_utils::deserialize_optional_date;
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct SubmitAttendance {
    /// Defaults to today (school-local). A date-time is cut to its date.
    #[schema(example = "2026-01-01", format = "date", value_type = Option<String>)]
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub date: Option<NaiveDate>,
    /// Defaults to the caller's own teacher profile
    #[schema(example = 7)]
    pub teacher_id: Option<u64>,
    /// The complete absent set for the class; everyone else is present
    #[schema(example = json!([1001, 1004]))]
    pub absent_student_ids: Vec<u64>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateQuery {
    /// Attendance date (YYYY-MM-DD); today when omitted
    #[param(value_type = Option<String>, example = "2026-01-01")]
    pub date: Option<NaiveDate>,
}

/// Submit a class roll call
#[utoipa::path(
    put,
    path = "/api/attendance/classes/{class_id}",
    params(
        ("class_id" = String, Path, description = "Class (grade) id")
    ),
    request_body(
        content = SubmitAttendance,
        description = "Absent students for the class and date",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Attendance saved", body = ReconcileOutcome),
        (status = 400, description = "Class is not tracked or teacher_id missing", body = Object, example = json!({
            "message": "invalid input: teacher_id is required"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden", body = Object, example = json!({
            "message": "forbidden: teachers may only record attendance for today"
        })),
        (status = 404, description = "Class, teacher or student not found"),
        (status = 409, description = "Conflicting concurrent write; retry"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn submit_attendance(
    auth: AuthUser,
    recorder: web::Data<AttendanceRecorder>,
    path: web::Path<String>,
    payload: web::Json<SubmitAttendance>,
) -> AttendanceResult<HttpResponse> {
    let class_id = path.into_inner();
    let payload = payload.into_inner();

    let date = payload.date.unwrap_or_else(|| recorder.today());
    let teacher_id = payload
        .teacher_id
        .or(auth.caller.teacher_id)
        .ok_or_else(|| AttendanceError::InvalidInput("teacher_id is required".into()))?;

    let outcome = recorder
        .reconcile(
            &auth.caller,
            &class_id,
            date,
            teacher_id,
            &payload.absent_student_ids,
        )
        .await?;

    Ok(HttpResponse::Ok().json(outcome))
}

/// Roll-call sheet for a class
#[utoipa::path(
    get,
    path = "/api/attendance/classes/{class_id}",
    params(
        ("class_id" = String, Path, description = "Class (grade) id"),
        DateQuery
    ),
    responses(
        (status = 200, description = "Students with their status for the date", body = ClassRoll),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Class not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn class_roll(
    auth: AuthUser,
    recorder: web::Data<AttendanceRecorder>,
    path: web::Path<String>,
    query: web::Query<DateQuery>,
) -> AttendanceResult<HttpResponse> {
    let roll = recorder
        .class_roll(&auth.caller, &path.into_inner(), query.date)
        .await?;

    Ok(HttpResponse::Ok().json(roll))
}
