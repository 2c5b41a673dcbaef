use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::job::{Job, JobStatus};
use crate::models::window::TimeWindow;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
}

impl ProposalStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ProposalStatus::Approved | ProposalStatus::Rejected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProposalStatus::Draft => "draft",
            ProposalStatus::Pending => "pending",
            ProposalStatus::Approved => "approved",
            ProposalStatus::Rejected => "rejected",
        }
    }

    /// Whether the state machine allows `self -> next`.
    pub fn can_transition_to(self, next: ProposalStatus) -> bool {
        match (self, next) {
            (ProposalStatus::Draft, ProposalStatus::Pending) => true,
            (ProposalStatus::Pending, ProposalStatus::Approved) => true,
            (ProposalStatus::Pending, ProposalStatus::Rejected) => true,
            (ProposalStatus::Draft, _)
            | (ProposalStatus::Pending, _)
            | (ProposalStatus::Approved, _)
            | (ProposalStatus::Rejected, _) => false,
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ProposalStatus::Draft),
            "pending" => Ok(ProposalStatus::Pending),
            "approved" => Ok(ProposalStatus::Approved),
            "rejected" => Ok(ProposalStatus::Rejected),
            other => Err(AppError::InvalidInput(format!(
                "unknown proposal status: {other}"
            ))),
        }
    }
}

/// The scheduling fields of a job as they were when an assignment was drafted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleSnapshot {
    pub worker_ids: Vec<Uuid>,
    pub window: TimeWindow,
    pub status: JobStatus,
}

impl ScheduleSnapshot {
    pub fn of(job: &Job) -> Self {
        Self {
            worker_ids: job.assigned_worker_ids.clone(),
            window: job.window,
            status: job.status,
        }
    }

    pub fn matches(&self, job: &Job) -> bool {
        self.worker_ids == job.assigned_worker_ids
            && self.window == job.window
            && self.status == job.status
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProposedAssignment {
    pub job_id: Uuid,
    pub worker_ids: Vec<Uuid>,
    pub window: TimeWindow,
    pub baseline: ScheduleSnapshot,
}

impl ProposedAssignment {
    /// Writes the scheduling fields onto `job`. Everything else is left alone.
    pub fn apply_to(&self, job: &mut Job, now: DateTime<Utc>) {
        job.assigned_worker_ids = self.worker_ids.clone();
        job.window = self.window;
        if job.status == JobStatus::PendingApproval {
            job.status = JobStatus::Scheduled;
        }
        job.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleProposal {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub status: ProposalStatus,
    pub assignments: Vec<ProposedAssignment>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl ScheduleProposal {
    /// Returns the proposal moved to `next`. Terminal proposals never change.
    pub fn transitioned(
        &self,
        next: ProposalStatus,
        reviewer: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> Result<ScheduleProposal, AppError> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::state_conflict(format!(
                "proposal {} is {}, cannot move to {}",
                self.id, self.status, next
            )));
        }

        let mut updated = self.clone();
        updated.status = next;
        if next.is_terminal() {
            updated.reviewed_by = reviewer;
            updated.reviewed_at = Some(at);
        }
        Ok(updated)
    }

    pub fn job_ids(&self) -> Vec<Uuid> {
        self.assignments.iter().map(|a| a.job_id).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProposalEvent {
    Created { proposal_id: Uuid, status: ProposalStatus },
    Submitted { proposal_id: Uuid },
    Approved { proposal_id: Uuid, reviewer_id: Uuid },
    Rejected { proposal_id: Uuid, reviewer_id: Uuid },
}
