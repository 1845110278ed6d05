//! Civil-time helpers anchored to a configured IANA timezone.
//!
//! "Today", kickoff waits and the end-of-day cutoff are all civil-time
//! concepts. Everything here converts through [`chrono_tz`] so DST
//! transitions shift wall-clock boundaries instead of silently drifting
//! them by an hour twice a year.

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{MatchdayError, Result};

/// Timezone-aware clock for scheduling decisions.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    tz: Tz,
}

impl Clock {
    pub fn new(timezone: &str) -> Result<Self> {
        let tz = timezone
            .parse::<Tz>()
            .map_err(|_| MatchdayError::InvalidTimezone(timezone.to_string()))?;
        Ok(Self { tz })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    pub fn to_local(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.tz)
    }

    /// Local calendar date of `now`, formatted the way the fixture API
    /// expects (`YYYY-MM-DD`).
    pub fn date_string(&self, now: DateTime<Tz>) -> String {
        now.format("%Y-%m-%d").to_string()
    }

    pub fn today_string(&self) -> String {
        self.date_string(self.now())
    }

    /// First instant of the next local calendar day.
    pub fn end_of_day(&self, now: DateTime<Tz>) -> DateTime<Tz> {
        let next_midnight = now
            .date_naive()
            .succ_opt()
            .unwrap_or_else(|| now.date_naive())
            .and_time(NaiveTime::MIN);
        self.localize(next_midnight)
    }

    /// Next occurrence of `trigger` local time strictly after `now`.
    pub fn next_trigger(&self, now: DateTime<Tz>, trigger: NaiveTime) -> DateTime<Tz> {
        let today = now.date_naive().and_time(trigger);
        let candidate = self.localize(today);
        if candidate > now {
            return candidate;
        }
        let tomorrow = now
            .date_naive()
            .succ_opt()
            .unwrap_or_else(|| now.date_naive())
            .and_time(trigger);
        self.localize(tomorrow)
    }

    /// Resolve a naive local timestamp against the timezone.
    ///
    /// Ambiguous times (fall-back hour) take the earlier offset. Times inside
    /// a spring-forward gap are pushed one hour later, which lands them right
    /// after the transition.
    fn localize(&self, naive: NaiveDateTime) -> DateTime<Tz> {
        match self.tz.from_local_datetime(&naive) {
            chrono::LocalResult::Single(dt) => dt,
            chrono::LocalResult::Ambiguous(earlier, _) => earlier,
            chrono::LocalResult::None => {
                let shifted = naive + Duration::hours(1);
                match self.tz.from_local_datetime(&shifted) {
                    chrono::LocalResult::Single(dt) => dt,
                    chrono::LocalResult::Ambiguous(earlier, _) => earlier,
                    chrono::LocalResult::None => self.tz.from_utc_datetime(&naive),
                }
            }
        }
    }
}
