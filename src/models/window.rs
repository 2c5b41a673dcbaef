use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Longest window accepted from callers.
pub const MAX_SPAN_DAYS: i64 = 366;

/// Half-open interval `[start, end)` in UTC. Construction guarantees `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawWindow> for TimeWindow {
    type Error = AppError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        TimeWindow::new(raw.start, raw.end)
    }
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, AppError> {
        if end <= start {
            return Err(AppError::InvalidInput(format!(
                "window end {end} must be after start {start}"
            )));
        }
        if end - start > Duration::days(MAX_SPAN_DAYS) {
            return Err(AppError::InvalidInput(format!(
                "window may span at most {MAX_SPAN_DAYS} days"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn from_duration_hours(start: DateTime<Utc>, hours: f64) -> Result<Self, AppError> {
        if !hours.is_finite() || hours <= 0.0 {
            return Err(AppError::InvalidInput(format!(
                "duration must be > 0 hours, got {hours}"
            )));
        }
        if hours > (MAX_SPAN_DAYS * 24) as f64 {
            return Err(AppError::InvalidInput(format!(
                "duration may be at most {} hours, got {hours}",
                MAX_SPAN_DAYS * 24
            )));
        }
        let end = Duration::try_minutes((hours * 60.0).round() as i64)
            .and_then(|span| start.checked_add_signed(span))
            .ok_or_else(|| AppError::InvalidInput(format!("duration of {hours} hours overflows")))?;
        Self::new(start, end)
    }

    /// The whole UTC day `[date 00:00, date+1 00:00)`.
    pub fn day(date: NaiveDate) -> Self {
        let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
        Self {
            start,
            end: start + Duration::days(1),
        }
    }

    /// Monday 00:00 through the following Monday 00:00 of the week containing `date`.
    pub fn week_of(date: NaiveDate) -> Self {
        let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        let start = monday.and_time(chrono::NaiveTime::MIN).and_utc();
        Self {
            start,
            end: start + Duration::days(7),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }

    pub fn intersection(&self, other: &TimeWindow) -> Option<TimeWindow> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (end > start).then_some(TimeWindow { start, end })
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 3600.0
    }

    /// Every calendar date the window touches. The exclusive end does not count.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let last = (self.end - Duration::nanoseconds(1)).date_naive();
        let mut dates = Vec::new();
        let mut current = self.start.date_naive();
        while current <= last {
            dates.push(current);
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }
        dates
    }
}

/// `[a, b)` and `[c, d)` overlap iff `a < d && c < b`. Adjacent windows do not overlap.
pub fn overlaps<T: PartialOrd>(a: T, b: T, c: T, d: T) -> bool {
    a < d && c < b
}

/// Signed minutes from the end of `earlier` to the start of `later`.
pub fn gap_minutes(earlier: &TimeWindow, later: &TimeWindow) -> i64 {
    (later.start - earlier.end).num_minutes()
}
