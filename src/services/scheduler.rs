//! Report Scheduler
//!
//! Fires the daily report once per day at the configured school-local time.
//! Targets are kept as wall-clock times and resolved through the school's
//! time zone before sleeping, so days with a DST switch are 23 or 25 hours.
//! Firings run one at a time inside the loop; a failed firing is logged and
//! the loop carries on with the next day.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::services::clock::{Clock, resolve_local};
use crate::services::report::{ReportService, Trigger};

/// First firing instant at or after `now`.
pub fn next_fire_at(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if now <= today {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Next target after a firing. Stays on the daily cadence unless the
/// firing itself ran past that instant.
fn following_fire(previous: NaiveDateTime, now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let next = previous + Duration::days(1);
    if next >= now {
        next
    } else {
        next_fire_at(now, at)
    }
}

pub struct ReportScheduler {
    service: Arc<ReportService>,
    clock: Arc<dyn Clock>,
    fire_at: NaiveTime,
    shutdown: CancellationToken,
}

impl ReportScheduler {
    pub fn new(
        service: Arc<ReportService>,
        clock: Arc<dyn Clock>,
        fire_at: NaiveTime,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            service,
            clock,
            fire_at,
            shutdown,
        }
    }

    /// Main loop: wait for the target, fire, repeat until shutdown.
    pub async fn run(self) {
        tracing::info!(fire_at = %self.fire_at, "Report scheduler started");

        let mut target = next_fire_at(self.clock.now(), self.fire_at);
        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            let instant = resolve_local(target, self.clock.timezone());
            let wait = (instant - self.clock.now_utc())
                .to_std()
                .unwrap_or(std::time::Duration::ZERO);
            tracing::info!(
                next = %target,
                "Next daily report in {} minutes",
                wait.as_secs() / 60
            );

            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Report scheduler received shutdown signal");
                    break;
                }
                _ = tokio::time::sleep(wait) => {}
            }

            // A firing that has started is allowed to finish.
            if let Err(e) = self.service.fire(Trigger::Scheduled).await {
                tracing::error!(error = %e, "Daily attendance report failed");
            }

            target = following_fire(target, self.clock.now(), self.fire_at);
        }

        tracing::info!("Report scheduler stopped");
    }
}
