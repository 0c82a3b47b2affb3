//! Firing: compile today's report, render it and hand it to the dispatcher.
//! Scheduled and on-demand triggers share this path.

use std::sync::Arc;
use strum_macros::Display;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::AttendanceResult;
use crate::model::report::DailyReport;
use crate::services::clock::Clock;
use crate::services::compiler::ReportCompiler;
use crate::services::mailer::ReportDispatcher;
use crate::services::render::ReportRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Trigger {
    Scheduled,
    OnDemand,
}

pub struct ReportService {
    compiler: ReportCompiler,
    renderer: Arc<dyn ReportRenderer>,
    dispatcher: Arc<dyn ReportDispatcher>,
    clock: Arc<dyn Clock>,
    recipient: String,
}

impl ReportService {
    pub fn new(
        compiler: ReportCompiler,
        renderer: Arc<dyn ReportRenderer>,
        dispatcher: Arc<dyn ReportDispatcher>,
        clock: Arc<dyn Clock>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            compiler,
            renderer,
            dispatcher,
            clock,
            recipient: recipient.into(),
        }
    }

    pub fn compiler(&self) -> &ReportCompiler {
        &self.compiler
    }

    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }

    #[instrument(name = "report_firing", skip(self), fields(firing_id = %Uuid::new_v4()))]
    pub async fn fire(&self, trigger: Trigger) -> AttendanceResult<DailyReport> {
        let date = self.clock.today();
        let report = self.compiler.daily_report(date).await?;

        let subject = self.renderer.subject(&report);
        let body = self.renderer.body(&report);
        self.dispatcher
            .dispatch(&self.recipient, &subject, &body)
            .await?;

        info!(
            %date,
            recipient = %self.recipient,
            absent = report.total_absent(),
            pending = report.pending_classes.len(),
            completion = report.completion_percentage,
            "Daily attendance report sent"
        );

        Ok(report)
    }
}
