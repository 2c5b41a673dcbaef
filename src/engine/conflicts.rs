use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::job::{dedup_worker_ids, JobStatus};
use crate::models::window::TimeWindow;
use crate::store::{JobFilter, Repository};

/// An existing job that would double-book one or more of the requested workers.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JobConflict {
    pub job_id: Uuid,
    pub window: TimeWindow,
    pub status: JobStatus,
    pub service_type: String,
    pub customer_name: Option<String>,
    pub conflicting_worker_ids: Vec<Uuid>,
}

impl JobConflict {
    /// Dispatcher-facing sentence, e.g. "Sam is already booked for Lawn care (Ada Park) 09:30-10:30".
    pub fn describe(&self, worker_names: &HashMap<Uuid, String>) -> String {
        let names: Vec<String> = self
            .conflicting_worker_ids
            .iter()
            .map(|id| {
                worker_names
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| id.to_string())
            })
            .collect();
        let verb = if names.len() == 1 { "is" } else { "are" };
        let customer = self
            .customer_name
            .as_deref()
            .map(|name| format!(" ({name})"))
            .unwrap_or_default();

        format!(
            "{} {verb} already booked for {}{customer} {}-{}",
            names.join(", "),
            self.service_type,
            self.window.start().format("%Y-%m-%d %H:%M"),
            self.window.end().format("%H:%M"),
        )
    }
}

pub fn conflict_message(conflicts: &[JobConflict], worker_names: &HashMap<Uuid, String>) -> String {
    if conflicts.is_empty() {
        return "no scheduling conflicts".to_string();
    }
    conflicts
        .iter()
        .map(|conflict| conflict.describe(worker_names))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Clone)]
pub struct ConflictDetector {
    repo: Arc<dyn Repository>,
}

impl ConflictDetector {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Open jobs of `provider_id` overlapping `window` that share a worker with `worker_ids`.
    pub async fn find_conflicts(
        &self,
        provider_id: Uuid,
        window: &TimeWindow,
        worker_ids: &[Uuid],
        exclude_job_id: Option<Uuid>,
    ) -> Result<Vec<JobConflict>, AppError> {
        if worker_ids.is_empty() {
            return Err(AppError::InvalidInput(
                "at least one worker id is required".to_string(),
            ));
        }
        let exclude: Vec<Uuid> = exclude_job_id.into_iter().collect();
        self.overlapping_jobs(provider_id, window, worker_ids, &exclude, &JobStatus::OPEN)
            .await
    }

    /// Crew variant: members are unioned (first-seen order) before the lookup.
    pub async fn find_crew_conflicts(
        &self,
        provider_id: Uuid,
        window: &TimeWindow,
        crews: &[Vec<Uuid>],
        exclude_job_id: Option<Uuid>,
    ) -> Result<Vec<JobConflict>, AppError> {
        let members: Vec<Uuid> = crews.iter().flatten().copied().collect();
        let members = dedup_worker_ids(&members);
        self.find_conflicts(provider_id, window, &members, exclude_job_id)
            .await
    }

    pub(crate) async fn overlapping_jobs(
        &self,
        provider_id: Uuid,
        window: &TimeWindow,
        worker_ids: &[Uuid],
        exclude_job_ids: &[Uuid],
        statuses: &[JobStatus],
    ) -> Result<Vec<JobConflict>, AppError> {
        let filter = JobFilter {
            worker_ids: Some(worker_ids.to_vec()),
            window: Some(*window),
            statuses: Some(statuses.to_vec()),
            customer_id: None,
            exclude_job_ids: exclude_job_ids.to_vec(),
        };

        let jobs = self.repo.list_jobs(provider_id, &filter).await?;

        Ok(jobs
            .into_iter()
            .map(|job| JobConflict {
                conflicting_worker_ids: job.shares_worker_with(worker_ids),
                job_id: job.id,
                window: job.window,
                status: job.status,
                service_type: job.service_type,
                customer_name: job.customer_name,
            })
            .collect())
    }
}
