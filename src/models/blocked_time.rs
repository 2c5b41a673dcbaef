use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::window::TimeWindow;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RecurrenceEnd {
    Never,
    OnDate(NaiveDate),
    AfterOccurrences(u32),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockSchedule {
    /// Every day in `[from_date, to_date)`.
    OneOff {
        from_date: NaiveDate,
        to_date: NaiveDate,
    },
    Recurring {
        starts_on: NaiveDate,
        days_of_week: Vec<Weekday>,
        ends: RecurrenceEnd,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedTime {
    pub id: Uuid,
    pub worker_id: Uuid,
    pub reason: Option<String>,
    pub schedule: BlockSchedule,
    /// Both unset means the block covers the whole day.
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

/// How a block occupies each day it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailySpan {
    AllDay,
    Timed(NaiveTime, NaiveTime),
    /// Only one bound set, or `end <= start`. Never blocks anything.
    Malformed,
}

impl BlockedTime {
    pub fn daily_span(&self) -> DailySpan {
        match (self.start_time, self.end_time) {
            (None, None) => DailySpan::AllDay,
            (Some(start), Some(end)) if end > start => DailySpan::Timed(start, end),
            _ => DailySpan::Malformed,
        }
    }

    pub fn applies_on(&self, date: NaiveDate) -> bool {
        match &self.schedule {
            BlockSchedule::OneOff { from_date, to_date } => *from_date <= date && date < *to_date,
            BlockSchedule::Recurring {
                starts_on,
                days_of_week,
                ends,
            } => {
                if date < *starts_on || !days_of_week.contains(&date.weekday()) {
                    return false;
                }
                match ends {
                    RecurrenceEnd::Never => true,
                    RecurrenceEnd::OnDate(last) => date <= *last,
                    RecurrenceEnd::AfterOccurrences(limit) => {
                        occurrences_through(*starts_on, days_of_week, date) <= u64::from(*limit)
                    }
                }
            }
        }
    }

    /// The concrete blocked interval on `date`, if the block applies that day.
    pub fn window_on(&self, date: NaiveDate) -> Option<TimeWindow> {
        if !self.applies_on(date) {
            return None;
        }
        match self.daily_span() {
            DailySpan::AllDay => Some(TimeWindow::day(date)),
            DailySpan::Timed(start, end) => TimeWindow::new(
                date.and_time(start).and_utc(),
                date.and_time(end).and_utc(),
            )
            .ok(),
            DailySpan::Malformed => None,
        }
    }

    /// Blocked intervals that overlap `window`, one per applicable day.
    pub fn overlapping(&self, window: &TimeWindow) -> Vec<TimeWindow> {
        window
            .dates()
            .into_iter()
            .filter_map(|date| self.window_on(date))
            .filter(|blocked| blocked.overlaps(window))
            .collect()
    }

    /// Whether the block can still apply on or after `date`.
    pub fn is_live_on_or_after(&self, date: NaiveDate) -> bool {
        match &self.schedule {
            BlockSchedule::OneOff { to_date, .. } => date < *to_date,
            BlockSchedule::Recurring { ends, .. } => match ends {
                RecurrenceEnd::Never | RecurrenceEnd::AfterOccurrences(_) => true,
                RecurrenceEnd::OnDate(last) => date <= *last,
            },
        }
    }
}

/// Number of matching weekdays in `[starts_on, date]`.
fn occurrences_through(starts_on: NaiveDate, days: &[Weekday], date: NaiveDate) -> u64 {
    if date < starts_on || days.is_empty() {
        return 0;
    }

    let span_days = (date - starts_on).num_days() + 1;
    let full_weeks = span_days / 7;
    let mut count = full_weeks as u64 * unique_days(days) as u64;

    let mut cursor = starts_on + Duration::days(full_weeks * 7);
    while cursor <= date {
        if days.contains(&cursor.weekday()) {
            count += 1;
        }
        cursor += Duration::days(1);
    }
    count
}

fn unique_days(days: &[Weekday]) -> usize {
    let mut seen: Vec<Weekday> = Vec::with_capacity(days.len());
    for day in days {
        if !seen.contains(day) {
            seen.push(*day);
        }
    }
    seen.len()
}
