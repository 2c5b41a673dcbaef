use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::window::TimeWindow;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    PendingApproval,
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    /// Statuses that occupy a worker's calendar for availability purposes.
    pub const COMMITTED: [JobStatus; 3] = [
        JobStatus::Scheduled,
        JobStatus::Confirmed,
        JobStatus::InProgress,
    ];

    /// Statuses that can still double-book a worker.
    pub const OPEN: [JobStatus; 4] = [
        JobStatus::PendingApproval,
        JobStatus::Scheduled,
        JobStatus::Confirmed,
        JobStatus::InProgress,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::PendingApproval => "pending_approval",
            JobStatus::Scheduled => "scheduled",
            JobStatus::Confirmed => "confirmed",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_approval" => Ok(JobStatus::PendingApproval),
            "scheduled" => Ok(JobStatus::Scheduled),
            "confirmed" => Ok(JobStatus::Confirmed),
            "in_progress" => Ok(JobStatus::InProgress),
            "completed" => Ok(JobStatus::Completed),
            "cancelled" => Ok(JobStatus::Cancelled),
            other => Err(AppError::InvalidInput(format!("unknown job status: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub customer_name: Option<String>,
    pub service_type: String,
    pub window: TimeWindow,
    pub address: Option<String>,
    pub location: Option<GeoPoint>,
    pub zone_code: Option<String>,
    pub status: JobStatus,
    /// Ordered, duplicate-free list of worker ids.
    #[serde(default)]
    pub assigned_worker_ids: Vec<Uuid>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_crew_size")]
    pub crew_size_required: u32,
    pub updated_at: DateTime<Utc>,
}

fn default_crew_size() -> u32 {
    1
}

impl Job {
    pub fn is_assigned_to(&self, worker_id: &Uuid) -> bool {
        self.assigned_worker_ids.contains(worker_id)
    }

    pub fn shares_worker_with(&self, worker_ids: &[Uuid]) -> Vec<Uuid> {
        self.assigned_worker_ids
            .iter()
            .filter(|id| worker_ids.contains(id))
            .copied()
            .collect()
    }
}

/// Removes duplicate ids while keeping first-seen order.
pub fn dedup_worker_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}
