//! Hour-of-day buckets and their resolution from a relative day selection.

use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;

use crate::error::AnalysisError;

/// Hour used when the caller does not pick one.
pub const DEFAULT_HOUR: u32 = 18;

/// One hour of one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HourBucket {
    pub date: NaiveDate,
    pub hour: u32,
}

impl HourBucket {
    pub fn new(date: NaiveDate, hour: u32) -> Result<Self, AnalysisError> {
        if hour > 23 {
            return Err(AnalysisError::InvalidHour(hour));
        }
        Ok(Self { date, hour })
    }

    /// Resolves `hour` on the day `day_offset` days away from `now`'s local date.
    pub fn resolve<Z: TimeZone>(
        now: &DateTime<Z>,
        hour: u32,
        day_offset: i64,
    ) -> Result<Self, AnalysisError> {
        let date = TimeDelta::try_days(day_offset)
            .and_then(|delta| now.date_naive().checked_add_signed(delta))
            .ok_or(AnalysisError::DayOutOfRange(day_offset))?;
        Self::new(date, hour)
    }

    /// Lower-case English weekday name, e.g. `"tuesday"`.
    pub fn day_of_week(&self) -> String {
        self.date.format("%A").to_string().to_lowercase()
    }

    /// The bucket one hour earlier, rolling back to 23:00 of the previous day.
    pub fn previous(&self) -> Option<Self> {
        if self.hour == 0 {
            let date = self.date.pred_opt()?;
            Some(Self { date, hour: 23 })
        } else {
            Some(Self {
                date: self.date,
                hour: self.hour - 1,
            })
        }
    }

    /// Whether `at`, viewed in `tz`, falls inside this bucket.
    pub fn contains(&self, at: DateTime<Utc>, tz: &Tz) -> bool {
        let local = at.with_timezone(tz);
        local.date_naive() == self.date && local.hour() == self.hour
    }
}

impl fmt::Display for HourBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02}:00-{:02}:00",
            self.date,
            self.hour,
            (self.hour + 1) % 24
        )
    }
}

/// Picks the hour and day offset to show when none is given.
///
/// Today only has data for completed hours, so the latest selectable hour is
/// the previous one. When no hour of today qualifies the selection falls
/// back to yesterday.
pub fn default_selection<Z: TimeZone>(now: &DateTime<Z>, day_offset: i64) -> (u32, i64) {
    if day_offset != 0 {
        return (DEFAULT_HOUR, day_offset);
    }

    let latest = now.hour().saturating_sub(1);
    if latest == 0 {
        (DEFAULT_HOUR, -1)
    } else {
        (latest.min(DEFAULT_HOUR), 0)
    }
}
