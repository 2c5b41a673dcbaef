pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::assignment::AssignmentConflict;
use crate::models::blocked_time::BlockedTime;
use crate::models::crew::Crew;
use crate::models::job::{GeoPoint, Job, JobStatus};
use crate::models::proposal::ScheduleProposal;
use crate::models::service::ServiceTypeConfig;
use crate::models::window::TimeWindow;
use crate::models::worker::{Worker, WorkerStatus};

/// Job query. Unset fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    /// Jobs assigned to any of these workers.
    pub worker_ids: Option<Vec<Uuid>>,
    /// Jobs whose window overlaps this one.
    pub window: Option<TimeWindow>,
    pub statuses: Option<Vec<JobStatus>>,
    pub customer_id: Option<Uuid>,
    pub exclude_job_ids: Vec<Uuid>,
}

impl JobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        if self.exclude_job_ids.contains(&job.id) {
            return false;
        }
        if let Some(ids) = &self.worker_ids {
            if !job.assigned_worker_ids.iter().any(|id| ids.contains(id)) {
                return false;
            }
        }
        if let Some(window) = &self.window {
            if !job.window.overlaps(window) {
                return false;
            }
        }
        if let Some(statuses) = &self.statuses {
            if !statuses.contains(&job.status) {
                return false;
            }
        }
        if let Some(customer_id) = self.customer_id {
            if job.customer_id != Some(customer_id) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkerFilter {
    pub status: Option<WorkerStatus>,
    pub ids: Option<Vec<Uuid>>,
}

impl WorkerFilter {
    pub fn active() -> Self {
        Self {
            status: Some(WorkerStatus::Active),
            ids: None,
        }
    }

    pub fn matches(&self, worker: &Worker) -> bool {
        self.status.is_none_or(|status| worker.status == status)
            && self.ids.as_ref().is_none_or(|ids| ids.contains(&worker.id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    Committed,
    /// Nothing was written. Lists the assignments whose target job moved on.
    Stale(Vec<AssignmentConflict>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub jobs: usize,
    pub workers: usize,
    pub proposals: usize,
}

/// Storage seam for the scheduling core. Any `Err` is a dependency failure.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn get_job(&self, id: Uuid) -> Result<Option<Job>, AppError>;

    async fn list_jobs(&self, provider_id: Uuid, filter: &JobFilter) -> Result<Vec<Job>, AppError>;

    async fn save_job(&self, job: Job) -> Result<(), AppError>;

    /// Stores geocoded coordinates without touching the scheduling fields.
    async fn set_job_location(
        &self,
        job_id: Uuid,
        location: GeoPoint,
        zone_code: Option<String>,
    ) -> Result<(), AppError>;

    async fn get_worker(&self, id: Uuid) -> Result<Option<Worker>, AppError>;

    async fn list_workers(
        &self,
        provider_id: Uuid,
        filter: &WorkerFilter,
    ) -> Result<Vec<Worker>, AppError>;

    async fn get_crew(&self, id: Uuid) -> Result<Option<Crew>, AppError>;

    /// Blocks of `worker_id` that may apply somewhere inside `window`.
    async fn list_blocked_times(
        &self,
        worker_id: Uuid,
        window: &TimeWindow,
    ) -> Result<Vec<BlockedTime>, AppError>;

    async fn get_service_config(
        &self,
        provider_id: Uuid,
        service_type: &str,
    ) -> Result<Option<ServiceTypeConfig>, AppError>;

    async fn get_proposal(&self, id: Uuid) -> Result<Option<ScheduleProposal>, AppError>;

    async fn save_proposal(&self, proposal: ScheduleProposal) -> Result<(), AppError>;

    /// Applies every assignment of `proposal` to its stored job and saves the
    /// proposal in one transaction, provided the stored proposal is still
    /// pending and every target job still matches its baseline. Only the
    /// scheduling fields of a job are written.
    async fn commit_proposal(
        &self,
        proposal: ScheduleProposal,
        applied_at: DateTime<Utc>,
    ) -> Result<CommitOutcome, AppError>;

    async fn stats(&self) -> Result<StoreStats, AppError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
