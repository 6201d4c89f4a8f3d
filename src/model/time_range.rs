use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Half-open interval `[start, end)` in kiosk-local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    /// `[midnight, next midnight)` around `ts`.
    pub fn day_of(ts: NaiveDateTime) -> Self {
        Self::days_from(ts.date(), 1)
    }

    /// Monday-start week containing `ts`.
    pub fn week_of(ts: NaiveDateTime) -> Self {
        let offset = ts.date().weekday().num_days_from_monday() as i64;
        Self::days_from(ts.date() - Duration::days(offset), 7)
    }

    /// Calendar month, `None` for an invalid year/month pair.
    pub fn month_of(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };

        Some(Self {
            start: first.and_time(NaiveTime::MIN),
            end: next.and_time(NaiveTime::MIN),
        })
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts < self.end
    }

    /// Calendar day the range starts on.
    pub fn day(&self) -> NaiveDate {
        self.start.date()
    }

    fn days_from(first: NaiveDate, days: i64) -> Self {
        let start = first.and_time(NaiveTime::MIN);
        Self {
            start,
            end: start + Duration::days(days),
        }
    }
}
