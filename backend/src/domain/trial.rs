//! Timed trial of the triage assistant.
//!
//! Visitors get a fixed window of free chat. Only the start instant is kept
//! (in the session cookie); remaining time is always derived from a clock.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Default trial length.
pub const DEFAULT_TRIAL_DURATION: Duration = Duration::from_secs(300);

/// A started trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialSession {
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
}

impl TrialSession {
    pub fn start(now: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            started_at: now,
            duration,
        }
    }

    /// Time left at `now`, saturating at zero.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use chrono::{TimeDelta, Utc};
    /// use telesaude::domain::trial::TrialSession;
    ///
    /// let start = Utc::now();
    /// let trial = TrialSession::start(start, Duration::from_secs(300));
    /// assert_eq!(trial.remaining(start + TimeDelta::seconds(60)), Duration::from_secs(240));
    /// assert_eq!(trial.remaining(start + TimeDelta::seconds(900)), Duration::ZERO);
    /// ```
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        let elapsed = (now - self.started_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        self.duration.saturating_sub(elapsed)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now).is_zero()
    }

    /// Instant at which the trial ends.
    pub fn ends_at(&self) -> DateTime<Utc> {
        let delta = TimeDelta::from_std(self.duration).unwrap_or(TimeDelta::MAX);
        self.started_at
            .checked_add_signed(delta)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Public view at `now`.
    pub fn status(&self, now: DateTime<Utc>) -> TrialStatus {
        let remaining = self.remaining(now);
        TrialStatus {
            started_at: Some(self.started_at),
            ends_at: Some(self.ends_at()),
            remaining_seconds: remaining.as_secs(),
            expired: remaining.is_zero(),
        }
    }
}

/// Countdown state reported to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrialStatus {
    pub started_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub remaining_seconds: u64,
    pub expired: bool,
}

impl TrialStatus {
    /// Status of a trial that has not been started yet.
    pub fn not_started(duration: Duration) -> Self {
        Self {
            started_at: None,
            ends_at: None,
            remaining_seconds: duration.as_secs(),
            expired: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[rstest]
    #[case::fresh(0, 300, false)]
    #[case::midway(120, 180, false)]
    #[case::boundary(300, 0, true)]
    #[case::long_past(10_000, 0, true)]
    #[case::clock_behind(-30, 300, false)]
    fn remaining_saturates(
        #[case] elapsed_secs: i64,
        #[case] remaining_secs: u64,
        #[case] expired: bool,
    ) {
        let trial = TrialSession::start(start(), DEFAULT_TRIAL_DURATION);
        let now = start() + TimeDelta::seconds(elapsed_secs);
        assert_eq!(trial.remaining(now), Duration::from_secs(remaining_secs));
        assert_eq!(trial.is_expired(now), expired);
    }

    #[test]
    fn status_reports_end_instant() {
        let trial = TrialSession::start(start(), Duration::from_secs(90));
        let status = trial.status(start() + TimeDelta::seconds(30));
        assert_eq!(status.remaining_seconds, 60);
        assert_eq!(status.ends_at, Some(start() + TimeDelta::seconds(90)));
        assert!(!status.expired);
    }

    #[test]
    fn not_started_reports_full_window() {
        let status = TrialStatus::not_started(DEFAULT_TRIAL_DURATION);
        assert_eq!(status.remaining_seconds, 300);
        assert_eq!(status.started_at, None);
    }
}
