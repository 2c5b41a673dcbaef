use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::assignment::{AssignmentConflict, AssignmentIssue};
use crate::models::blocked_time::BlockedTime;
use crate::models::crew::Crew;
use crate::models::job::{GeoPoint, Job};
use crate::models::proposal::{ProposalStatus, ScheduleProposal};
use crate::models::service::ServiceTypeConfig;
use crate::models::window::TimeWindow;
use crate::models::worker::Worker;
use crate::store::{CommitOutcome, JobFilter, Repository, StoreStats, WorkerFilter};

/// Records loaded at startup from a JSON file.
#[derive(Debug, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub workers: Vec<Worker>,
    #[serde(default)]
    pub blocked_times: Vec<BlockedTime>,
    #[serde(default)]
    pub crews: Vec<Crew>,
    #[serde(default)]
    pub service_configs: Vec<ServiceTypeConfig>,
}

#[derive(Default)]
struct ScheduleTables {
    jobs: HashMap<Uuid, Job>,
    proposals: HashMap<Uuid, ScheduleProposal>,
}

/// In-process store. Jobs and proposals share one lock so a proposal
/// commit is observed entirely or not at all.
#[derive(Default)]
pub struct InMemoryRepository {
    schedule: RwLock<ScheduleTables>,
    workers: DashMap<Uuid, Worker>,
    blocked_times: DashMap<Uuid, BlockedTime>,
    crews: DashMap<Uuid, Crew>,
    service_configs: DashMap<(Uuid, String), ServiceTypeConfig>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, AppError> {
        let repo = Self::new();
        for worker in snapshot.workers {
            repo.insert_worker(worker);
        }
        for block in snapshot.blocked_times {
            repo.insert_blocked_time(block);
        }
        for crew in snapshot.crews {
            repo.insert_crew(crew);
        }
        for config in snapshot.service_configs {
            repo.insert_service_config(config);
        }
        for job in snapshot.jobs {
            repo.insert_job(job)?;
        }
        Ok(repo)
    }

    pub fn insert_job(&self, job: Job) -> Result<(), AppError> {
        self.write()?.jobs.insert(job.id, job);
        Ok(())
    }

    pub fn insert_worker(&self, worker: Worker) {
        self.workers.insert(worker.id, worker);
    }

    pub fn insert_blocked_time(&self, block: BlockedTime) {
        self.blocked_times.insert(block.id, block);
    }

    pub fn insert_crew(&self, crew: Crew) {
        self.crews.insert(crew.id, crew);
    }

    pub fn insert_service_config(&self, config: ServiceTypeConfig) {
        self.service_configs
            .insert((config.provider_id, config.service_type.clone()), config);
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, ScheduleTables>, AppError> {
        self.schedule
            .read()
            .map_err(|_| AppError::DependencyUnavailable("schedule store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, ScheduleTables>, AppError> {
        self.schedule
            .write()
            .map_err(|_| AppError::DependencyUnavailable("schedule store lock poisoned".to_string()))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_job(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        Ok(self.read()?.jobs.get(&id).cloned())
    }

    async fn list_jobs(&self, provider_id: Uuid, filter: &JobFilter) -> Result<Vec<Job>, AppError> {
        let tables = self.read()?;
        let mut jobs: Vec<Job> = tables
            .jobs
            .values()
            .filter(|job| job.provider_id == provider_id && filter.matches(job))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| a.window.start().cmp(&b.window.start()).then(a.id.cmp(&b.id)));
        Ok(jobs)
    }

    async fn save_job(&self, job: Job) -> Result<(), AppError> {
        self.write()?.jobs.insert(job.id, job);
        Ok(())
    }

    async fn set_job_location(
        &self,
        job_id: Uuid,
        location: GeoPoint,
        zone_code: Option<String>,
    ) -> Result<(), AppError> {
        let mut tables = self.write()?;
        let job = tables
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;
        job.location = Some(location);
        if zone_code.is_some() {
            job.zone_code = zone_code;
        }
        Ok(())
    }

    async fn get_worker(&self, id: Uuid) -> Result<Option<Worker>, AppError> {
        Ok(self.workers.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_workers(
        &self,
        provider_id: Uuid,
        filter: &WorkerFilter,
    ) -> Result<Vec<Worker>, AppError> {
        let mut workers: Vec<Worker> = self
            .workers
            .iter()
            .filter(|entry| entry.provider_id == provider_id && filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        workers.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(workers)
    }

    async fn get_crew(&self, id: Uuid) -> Result<Option<Crew>, AppError> {
        Ok(self.crews.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_blocked_times(
        &self,
        worker_id: Uuid,
        window: &TimeWindow,
    ) -> Result<Vec<BlockedTime>, AppError> {
        let first_day = window.start().date_naive();
        let mut blocks: Vec<BlockedTime> = self
            .blocked_times
            .iter()
            .filter(|entry| entry.worker_id == worker_id && entry.is_live_on_or_after(first_day))
            .map(|entry| entry.value().clone())
            .collect();
        blocks.sort_by_key(|block| block.id);
        Ok(blocks)
    }

    async fn get_service_config(
        &self,
        provider_id: Uuid,
        service_type: &str,
    ) -> Result<Option<ServiceTypeConfig>, AppError> {
        Ok(self
            .service_configs
            .get(&(provider_id, service_type.to_string()))
            .map(|entry| entry.value().clone()))
    }

    async fn get_proposal(&self, id: Uuid) -> Result<Option<ScheduleProposal>, AppError> {
        Ok(self.read()?.proposals.get(&id).cloned())
    }

    async fn save_proposal(&self, proposal: ScheduleProposal) -> Result<(), AppError> {
        let mut tables = self.write()?;
        if let Some(existing) = tables.proposals.get(&proposal.id) {
            if existing.status.is_terminal() {
                return Err(AppError::state_conflict(format!(
                    "proposal {} is already {}",
                    existing.id, existing.status
                )));
            }
        }
        tables.proposals.insert(proposal.id, proposal);
        Ok(())
    }

    async fn commit_proposal(
        &self,
        proposal: ScheduleProposal,
        applied_at: DateTime<Utc>,
    ) -> Result<CommitOutcome, AppError> {
        let mut tables = self.write()?;

        match tables.proposals.get(&proposal.id) {
            Some(stored) if stored.status == ProposalStatus::Pending => {}
            Some(stored) => {
                return Err(AppError::state_conflict(format!(
                    "proposal {} is {}, not pending",
                    stored.id, stored.status
                )));
            }
            None => return Err(AppError::NotFound(format!("proposal {} not found", proposal.id))),
        }

        let mut stale = Vec::new();
        for assignment in &proposal.assignments {
            let detail = match tables.jobs.get(&assignment.job_id) {
                None => Some("job no longer exists".to_string()),
                Some(current) if current.status.is_terminal() => {
                    Some(format!("job is {}", current.status))
                }
                Some(current) if !assignment.baseline.matches(current) => {
                    Some("job was reassigned or rescheduled after the proposal was drafted".to_string())
                }
                Some(_) => None,
            };
            if let Some(detail) = detail {
                stale.push(AssignmentConflict {
                    job_id: assignment.job_id,
                    worker_id: None,
                    issue: AssignmentIssue::Stale { detail },
                });
            }
        }

        if !stale.is_empty() {
            return Ok(CommitOutcome::Stale(stale));
        }

        for assignment in &proposal.assignments {
            if let Some(job) = tables.jobs.get_mut(&assignment.job_id) {
                assignment.apply_to(job, applied_at);
            }
        }
        tables.proposals.insert(proposal.id, proposal);
        Ok(CommitOutcome::Committed)
    }

    async fn stats(&self) -> Result<StoreStats, AppError> {
        let tables = self.read()?;
        Ok(StoreStats {
            jobs: tables.jobs.len(),
            workers: self.workers.len(),
            proposals: tables.proposals.len(),
        })
    }
}
