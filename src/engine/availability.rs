use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::engine::conflicts::{ConflictDetector, JobConflict};
use crate::error::AppError;
use crate::models::assignment::ConflictReason;
use crate::models::blocked_time::DailySpan;
use crate::models::job::{dedup_worker_ids, JobStatus};
use crate::models::window::TimeWindow;
use crate::models::worker::Worker;
use crate::store::Repository;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Availability {
    pub available: bool,
    pub conflicts: Vec<ConflictReason>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberAvailability {
    pub worker_id: Uuid,
    pub worker_name: String,
    pub available: bool,
    pub conflicts: Vec<ConflictReason>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewAvailability {
    pub all_available: bool,
    pub has_conflicts: bool,
    pub members: Vec<MemberAvailability>,
    pub conflicts: Vec<JobConflict>,
}

#[derive(Clone)]
pub struct AvailabilityChecker {
    repo: Arc<dyn Repository>,
    conflicts: ConflictDetector,
}

impl AvailabilityChecker {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self {
            conflicts: ConflictDetector::new(repo.clone()),
            repo,
        }
    }

    pub async fn check(
        &self,
        worker_id: Uuid,
        window: &TimeWindow,
        exclude_job_ids: &[Uuid],
    ) -> Result<Availability, AppError> {
        let worker = self
            .repo
            .get_worker(worker_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("worker {worker_id} not found")))?;

        self.check_worker(&worker, window, exclude_job_ids).await
    }

    pub async fn check_for_duration(
        &self,
        worker_id: Uuid,
        start: DateTime<Utc>,
        duration_hours: f64,
        exclude_job_ids: &[Uuid],
    ) -> Result<Availability, AppError> {
        let window = TimeWindow::from_duration_hours(start, duration_hours)?;
        self.check(worker_id, &window, exclude_job_ids).await
    }

    /// Blocked time first, then committed bookings. `available` iff neither overlaps.
    pub async fn check_worker(
        &self,
        worker: &Worker,
        window: &TimeWindow,
        exclude_job_ids: &[Uuid],
    ) -> Result<Availability, AppError> {
        let mut conflicts = Vec::new();

        for block in self.repo.list_blocked_times(worker.id, window).await? {
            if block.daily_span() == DailySpan::Malformed {
                warn!(
                    blocked_time_id = %block.id,
                    worker_id = %worker.id,
                    "ignoring blocked time with incomplete sub-window"
                );
                continue;
            }
            for blocked in block.overlapping(window) {
                conflicts.push(ConflictReason::Blocked {
                    blocked_time_id: block.id,
                    window: blocked,
                    note: block.reason.clone(),
                });
            }
        }

        let booked = self
            .conflicts
            .overlapping_jobs(
                worker.provider_id,
                window,
                &[worker.id],
                exclude_job_ids,
                &JobStatus::COMMITTED,
            )
            .await?;

        conflicts.extend(booked.into_iter().map(|job| ConflictReason::Booked {
            job_id: job.job_id,
            window: job.window,
            service_type: job.service_type,
            customer_name: job.customer_name,
        }));

        Ok(Availability {
            available: conflicts.is_empty(),
            conflicts,
        })
    }

    pub async fn check_crew(
        &self,
        crew_id: Uuid,
        window: &TimeWindow,
        exclude_job_id: Option<Uuid>,
    ) -> Result<CrewAvailability, AppError> {
        let crew = self
            .repo
            .get_crew(crew_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("crew {crew_id} not found")))?;

        self.check_members(crew.provider_id, &crew.member_ids, window, exclude_job_id)
            .await
    }

    /// `all_available` iff every member is individually available;
    /// `has_conflicts` iff some member already holds an overlapping open job.
    pub async fn check_members(
        &self,
        provider_id: Uuid,
        member_ids: &[Uuid],
        window: &TimeWindow,
        exclude_job_id: Option<Uuid>,
    ) -> Result<CrewAvailability, AppError> {
        let member_ids = dedup_worker_ids(member_ids);
        if member_ids.is_empty() {
            return Err(AppError::InvalidInput("crew has no members".to_string()));
        }

        let exclude: Vec<Uuid> = exclude_job_id.into_iter().collect();
        let mut members = Vec::with_capacity(member_ids.len());
        for worker_id in &member_ids {
            let worker = self
                .repo
                .get_worker(*worker_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("worker {worker_id} not found")))?;
            if worker.provider_id != provider_id {
                return Err(AppError::InvalidInput(format!(
                    "worker {worker_id} belongs to another provider"
                )));
            }

            let availability = self.check_worker(&worker, window, &exclude).await?;
            members.push(MemberAvailability {
                worker_id: worker.id,
                worker_name: worker.name,
                available: availability.available,
                conflicts: availability.conflicts,
            });
        }

        let conflicts = self
            .conflicts
            .find_crew_conflicts(
                provider_id,
                window,
                std::slice::from_ref(&member_ids),
                exclude_job_id,
            )
            .await?;

        Ok(CrewAvailability {
            all_available: members.iter().all(|m| m.available),
            has_conflicts: !conflicts.is_empty(),
            members,
            conflicts,
        })
    }

    pub fn conflict_detector(&self) -> &ConflictDetector {
        &self.conflicts
    }
}
