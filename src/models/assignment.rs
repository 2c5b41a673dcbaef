use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::window::TimeWindow;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    pub sla: f64,
    pub route: f64,
    pub continuity: f64,
    pub balance: f64,
}

/// Why a worker cannot take a window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ConflictReason {
    Blocked {
        blocked_time_id: Uuid,
        window: TimeWindow,
        note: Option<String>,
    },
    Booked {
        job_id: Uuid,
        window: TimeWindow,
        service_type: String,
        customer_name: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssignmentIssue {
    Unavailable(ConflictReason),
    OverlapsWithinProposal { other_job_id: Uuid },
    /// The target job changed after the proposal was drafted.
    Stale { detail: String },
}

/// One offending assignment reported when a proposal cannot be approved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssignmentConflict {
    pub job_id: Uuid,
    pub worker_id: Option<Uuid>,
    pub issue: AssignmentIssue,
}
