//! Session phases in the exchange's local timezone.

use chrono::{
    DateTime, Datelike, Duration, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday,
};
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::{Arc, RwLock};

/// Source of "now". Injected so backfill and analysis can run against a
/// pinned time in tests.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(now)),
        }
    }

    /// Pin the clock to an exchange-local wall time.
    pub fn at_local(tz: Tz, local: NaiveDateTime) -> Self {
        let utc = local
            .and_local_timezone(tz)
            .earliest()
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|| local.and_utc());
        Self::new(utc)
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.write() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.write() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.now.read().map(|t| *t).unwrap_or_else(|_| Utc::now())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// The `preopen_lead` window right before the open.
    PreOpen,
    /// Regular session, `[open, close)`.
    Regular,
    /// Anything else, including weekends.
    Closed,
}

/// Regular-session hours, all in exchange-local time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionHours {
    pub timezone: Tz,
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub preopen_lead: Duration,
    /// Positions still open at or after this time are liquidated.
    pub exit_cutoff: NaiveTime,
}

impl Default for SessionHours {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::America::New_York,
            open: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default(),
            close: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
            preopen_lead: Duration::minutes(10),
            exit_cutoff: NaiveTime::from_hms_opt(15, 50, 0).unwrap_or_default(),
        }
    }
}

impl SessionHours {
    /// Whether a local wall time falls inside `[open, close)`.
    pub fn is_regular(&self, time: NaiveTime) -> bool {
        self.open <= time && time < self.close
    }

    pub fn preopen_start(&self) -> NaiveTime {
        self.open - self.preopen_lead
    }
}

/// Pure mapping from wall time to session phase. Holds no state besides the
/// configured hours.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    hours: SessionHours,
}

impl SessionClock {
    pub fn new(hours: SessionHours) -> Self {
        Self { hours }
    }

    pub fn hours(&self) -> &SessionHours {
        &self.hours
    }

    pub fn timezone(&self) -> Tz {
        self.hours.timezone
    }

    /// Exchange-local wall time, seconds preserved.
    pub fn local(&self, now: DateTime<Utc>) -> NaiveDateTime {
        now.with_timezone(&self.hours.timezone).naive_local()
    }

    /// Exchange-local wall time truncated to the minute.
    pub fn local_minute(&self, now: DateTime<Utc>) -> NaiveDateTime {
        truncate_to_minute(self.local(now))
    }

    pub fn phase(&self, now: DateTime<Utc>) -> SessionPhase {
        self.phase_at_local(self.local(now))
    }

    pub fn phase_at_local(&self, local: NaiveDateTime) -> SessionPhase {
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return SessionPhase::Closed;
        }

        let time = local.time();
        if self.hours.is_regular(time) {
            SessionPhase::Regular
        } else if self.hours.preopen_start() <= time && time < self.hours.open {
            SessionPhase::PreOpen
        } else {
            SessionPhase::Closed
        }
    }

    /// Closed after the bell (as opposed to the overnight wait before pre-open).
    pub fn is_after_close(&self, now: DateTime<Utc>) -> bool {
        let local = self.local(now);
        self.phase_at_local(local) == SessionPhase::Closed && local.time() >= self.hours.close
    }
}

pub fn truncate_to_minute(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}
