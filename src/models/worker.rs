use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::window::TimeWindow;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Active,
    Inactive,
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerStatus::Active => f.write_str("active"),
            WorkerStatus::Inactive => f.write_str("inactive"),
        }
    }
}

impl FromStr for WorkerStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(WorkerStatus::Active),
            "inactive" => Ok(WorkerStatus::Inactive),
            other => Err(AppError::InvalidInput(format!(
                "unknown worker status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillLevel {
    pub skill_id: Uuid,
    pub proficiency: u8,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ShiftInterval {
    pub day: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkerMetrics {
    pub completed_jobs: u32,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub name: String,
    pub status: WorkerStatus,
    #[serde(default)]
    pub skills: Vec<SkillLevel>,
    /// Empty means no declared working hours, i.e. unrestricted.
    #[serde(default)]
    pub working_hours: Vec<ShiftInterval>,
    #[serde(default)]
    pub metrics: WorkerMetrics,
    pub updated_at: DateTime<Utc>,
}

impl Worker {
    pub fn is_active(&self) -> bool {
        self.status == WorkerStatus::Active
    }

    pub fn has_any_skill(&self, required: &[Uuid]) -> bool {
        required.is_empty()
            || self
                .skills
                .iter()
                .any(|skill| required.contains(&skill.skill_id))
    }

    /// True when no working hours are declared, or the window fits inside
    /// one declared interval of its weekday.
    pub fn works_during(&self, window: &TimeWindow) -> bool {
        if self.working_hours.is_empty() {
            return true;
        }

        let date = window.start().date_naive();
        let weekday = date.weekday();

        self.working_hours.iter().any(|shift| {
            if shift.day != weekday || shift.end <= shift.start {
                return false;
            }
            let shift_start = date.and_time(shift.start).and_utc();
            let shift_end = date.and_time(shift.end).and_utc();
            shift_start <= window.start() && window.end() <= shift_end
        })
    }
}
