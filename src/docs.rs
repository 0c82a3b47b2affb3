use crate::api::attendance::SubmitAttendance;
use crate::model::attendance::AttendanceStatus;
use crate::model::report::{
    AbsenceEntry, ClassRef, ClassRoll, ClassSummary, DailyReport, DailyRoster, DailySummary,
    RollEntry, RosterEntry,
};
use crate::model::student::Transport;
use crate::model::submission::SubmissionReceipt;
use crate::store::ReconcileOutcome;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "School Attendance API",
        version = "1.0.0",
        description = r#"
## School Attendance

Daily roll calls per class and the attendance report sent to the school office.

### 🔹 Key Features
- **Roll call**
  - Teachers submit the absent students of their class for today
  - Admins and supervisors may correct any class on any date
- **Daily report**
  - Absent students with class and transport, classes still missing a roll call,
    and the share of classes that submitted
  - Mailed automatically once a day and on demand
- **Roster**
  - Every student with their status for a day, filterable by class and status

### 🔐 Security
All endpoints require a **JWT Bearer** access token issued by the identity provider.
"#,
    ),
    paths(
        crate::api::attendance::submit_attendance,
        crate::api::attendance::class_roll,

        crate::api::report::daily_report,
        crate::api::report::daily_summary,
        crate::api::report::daily_roster,
        crate::api::report::send_report
    ),
    components(
        schemas(
            SubmitAttendance,
            ReconcileOutcome,
            SubmissionReceipt,
            ClassRoll,
            RollEntry,
            AttendanceStatus,
            Transport,
            ClassRef,
            AbsenceEntry,
            DailyReport,
            ClassSummary,
            DailySummary,
            RosterEntry,
            DailyRoster
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Class roll call APIs"),
        (name = "Report", description = "Daily attendance report APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
