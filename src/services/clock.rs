use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Wall clock of the school's time zone.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;

    fn timezone(&self) -> Tz;

    /// School-local wall-clock time.
    fn now(&self) -> NaiveDateTime {
        self.now_utc().with_timezone(&self.timezone()).naive_local()
    }

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Resolves a school-local wall-clock time to an instant.
///
/// An ambiguous time (clocks going back) resolves to its later occurrence.
/// A time skipped by a forward jump resolves to the same wall time one hour on.
pub fn resolve_local(local: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    local
        .and_local_timezone(tz)
        .latest()
        .or_else(|| (local + Duration::hours(1)).and_local_timezone(tz).latest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| local.and_utc())
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn timezone(&self) -> Tz {
        self.tz
    }
}

#[cfg(test)]
pub mod testing {
    use super::{Clock, resolve_local};
    use chrono::{DateTime, NaiveDateTime, Utc};
    use chrono_tz::Tz;
    use std::sync::Mutex;

    /// A UTC clock that only moves when told to.
    pub struct FixedClock(Mutex<NaiveDateTime>);

    impl FixedClock {
        pub fn at(now: NaiveDateTime) -> Self {
            Self(Mutex::new(now))
        }

        pub fn set(&self, now: NaiveDateTime) {
            *self.0.lock().unwrap() = now;
        }
    }

    impl Clock for FixedClock {
        fn now_utc(&self) -> DateTime<Utc> {
            self.0.lock().unwrap().and_utc()
        }

        fn timezone(&self) -> Tz {
            Tz::UTC
        }
    }

    /// Follows tokio's (pausable) timer, so virtual sleeps advance it.
    pub struct TokioClock {
        base: DateTime<Utc>,
        tz: Tz,
        started: tokio::time::Instant,
    }

    impl TokioClock {
        pub fn starting_at(base: NaiveDateTime) -> Self {
            Self::in_zone(base, Tz::UTC)
        }

        /// Starts at the given wall-clock time of `tz`.
        pub fn in_zone(local: NaiveDateTime, tz: Tz) -> Self {
            Self {
                base: resolve_local(local, tz),
                tz,
                started: tokio::time::Instant::now(),
            }
        }
    }

    impl Clock for TokioClock {
        fn now_utc(&self) -> DateTime<Utc> {
            let elapsed = chrono::Duration::from_std(self.started.elapsed()).unwrap();
            self.base + elapsed
        }

        fn timezone(&self) -> Tz {
            self.tz
        }
    }
}
