use crate::api::attendance::DateQuery;
use crate::auth::auth::AuthUser;
use crate::auth::policy::require_privileged;
use crate::error::AttendanceResult;
use crate::model::attendance::AttendanceStatus;
use crate::services::compiler::RosterFilter;
use crate::services::report::{ReportService, Trigger};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RosterQuery {
    /// Attendance date (YYYY-MM-DD); today when omitted
    #[param(value_type = Option<String>, example = "2026-01-01")]
    pub date: Option<NaiveDate>,
    /// Only students of this class
    #[param(example = "G5-A")]
    pub class_id: Option<String>,
    /// `present` or `absent`
    #[param(value_type = Option<String>, example = "absent")]
    pub status: Option<AttendanceStatus>,
}

/// Compiled daily report (JSON)
#[utoipa::path(
    get,
    path = "/api/attendance/report",
    params(DateQuery),
    responses(
        (status = 200, description = "Absences, pending classes and completion", body = DailyReport),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn daily_report(
    auth: AuthUser,
    service: web::Data<ReportService>,
    query: web::Query<DateQuery>,
) -> AttendanceResult<HttpResponse> {
    require_privileged(&auth.caller)?;

    let date = query.date.unwrap_or_else(|| service.today());
    let report = service.compiler().daily_report(date).await?;

    Ok(HttpResponse::Ok().json(report))
}

/// Per-class attendance figures
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    params(DateQuery),
    responses(
        (status = 200, description = "Present and absent counts per class", body = DailySummary),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn daily_summary(
    auth: AuthUser,
    service: web::Data<ReportService>,
    query: web::Query<DateQuery>,
) -> AttendanceResult<HttpResponse> {
    require_privileged(&auth.caller)?;

    let date = query.date.unwrap_or_else(|| service.today());
    let summary = service.compiler().daily_summary(date).await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// School-wide roster with each student's status
#[utoipa::path(
    get,
    path = "/api/attendance/roster",
    params(RosterQuery),
    responses(
        (status = 200, description = "Students of all tracked classes, absent or present", body = DailyRoster),
        (status = 400, description = "Invalid date or status"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn daily_roster(
    auth: AuthUser,
    service: web::Data<ReportService>,
    query: web::Query<RosterQuery>,
) -> AttendanceResult<HttpResponse> {
    require_privileged(&auth.caller)?;

    let query = query.into_inner();
    let date = query.date.unwrap_or_else(|| service.today());
    let filter = RosterFilter {
        class_id: query.class_id.filter(|id| !id.trim().is_empty()),
        status: query.status,
    };
    let roster = service.compiler().daily_roster(date, &filter).await?;

    Ok(HttpResponse::Ok().json(roster))
}

/// Compile and mail today's report now
#[utoipa::path(
    post,
    path = "/api/attendance/report/send",
    responses(
        (status = 200, description = "Report sent", body = DailyReport),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 502, description = "Mail transport failed", body = Object, example = json!({
            "message": "Failed to send the report"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn send_report(
    auth: AuthUser,
    service: web::Data<ReportService>,
) -> AttendanceResult<HttpResponse> {
    require_privileged(&auth.caller)?;

    tracing::info!(user = %auth.username, "On-demand report requested");
    let report = service.fire(Trigger::OnDemand).await?;

    Ok(HttpResponse::Ok().json(report))
}

#[cfg(test)]
mod tests {
    use crate::api::testing::{Fixture, bearer, day};
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    fn fixture() -> Fixture {
        let fx = Fixture::at(day(10).and_hms_opt(14, 0, 0).unwrap());
        for n in 1..=4 {
            fx.store.add_grade(&format!("G{n}"), &format!("Grade {n}"));
        }
        fx.store.add_grade("HS", "Home Schooling");
        fx.store.add_student(1, "Zaid", "G1", Some(2));
        fx.store.add_student(2, "Amna", "G1", None);
        fx.store.add_student(3, "Hind", "HS", None);
        fx.store.add_absence(1, "G1", day(10), 7);
        fx.store.add_absence(3, "HS", day(10), 7);
        fx.store.add_receipt("G1", day(10), 7);
        fx
    }

    #[actix_web::test]
    async fn report_lists_absences_and_pending_classes() {
        let fx = fixture();
        let app = test::init_service(App::new().configure(|cfg| fx.configure(cfg))).await;

        let req = test::TestRequest::get()
            .uri("/api/attendance/report")
            .insert_header(bearer(&["supervisor"], None))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["date"], json!("2026-03-10"));
        assert_eq!(body["completion_percentage"], json!(25.0));
        assert_eq!(body["absences"].as_array().unwrap().len(), 1);
        assert_eq!(body["absences"][0]["transport"], json!("bus"));
        assert_eq!(body["pending_classes"].as_array().unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn summary_for_an_explicit_date() {
        let fx = fixture();
        let app = test::init_service(App::new().configure(|cfg| fx.configure(cfg))).await;

        let req = test::TestRequest::get()
            .uri("/api/attendance/summary?date=2026-03-09")
            .insert_header(bearer(&["admin"], None))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["total_students"], json!(2));
        assert_eq!(body["total_absent"], json!(0));
        assert_eq!(body["attendance_percentage"], json!(100.0));
    }

    #[actix_web::test]
    async fn roster_marks_students_without_a_record_present() {
        let fx = fixture();
        fx.store.add_teacher(7, "Ms. Rahma");
        let app = test::init_service(App::new().configure(|cfg| fx.configure(cfg))).await;

        let req = test::TestRequest::get()
            .uri("/api/attendance/roster")
            .insert_header(bearer(&["admin"], None))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        // Hind is home-schooled and left out
        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["student_name"], json!("Amna"));
        assert_eq!(entries[0]["status"], json!("present"));
        assert_eq!(entries[0]["recorded_by"], Value::Null);
        assert_eq!(entries[1]["student_name"], json!("Zaid"));
        assert_eq!(entries[1]["status"], json!("absent"));
        assert_eq!(entries[1]["recorded_by"], json!("Ms. Rahma"));
        assert_eq!(entries[1]["recorded_at"], json!("2026-03-10T08:00:00"));
        assert_eq!(body["present"], json!(1));
        assert_eq!(body["absent"], json!(1));
    }

    #[actix_web::test]
    async fn roster_filters_by_status_and_rejects_unknown_status() {
        let fx = fixture();
        let app = test::init_service(App::new().configure(|cfg| fx.configure(cfg))).await;

        let req = test::TestRequest::get()
            .uri("/api/attendance/roster?class_id=G1&status=absent")
            .insert_header(bearer(&["supervisor"], None))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let ids: Vec<u64> = body["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["student_id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![1]);

        let req = test::TestRequest::get()
            .uri("/api/attendance/roster?status=late")
            .insert_header(bearer(&["supervisor"], None))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );

        let req = test::TestRequest::get()
            .uri("/api/attendance/roster")
            .insert_header(bearer(&["teacher"], Some(7)))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN
        );
    }

    #[actix_web::test]
    async fn teachers_cannot_read_the_report() {
        let fx = fixture();
        let app = test::init_service(App::new().configure(|cfg| fx.configure(cfg))).await;

        let req = test::TestRequest::get()
            .uri("/api/attendance/report")
            .insert_header(bearer(&["teacher"], Some(7)))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn send_now_mails_the_report() {
        let fx = fixture();
        let app = test::init_service(App::new().configure(|cfg| fx.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/api/attendance/report/send")
            .insert_header(bearer(&["admin"], None))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let sent = fx.dispatcher.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Daily attendance report - School - 2026-03-10");
    }

    #[actix_web::test]
    async fn send_now_reports_transport_failure() {
        let fx = Fixture::with_failing_dispatcher(day(10).and_hms_opt(14, 0, 0).unwrap(), 1);
        let app = test::init_service(App::new().configure(|cfg| fx.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/api/attendance/report/send")
            .insert_header(bearer(&["admin"], None))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(fx.dispatcher.attempts(), 1);
    }
}
