use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::availability::{Availability, AvailabilityChecker};
use crate::error::AppError;
use crate::geo::{haversine_km, travel_minutes, Geocoder};
use crate::models::assignment::{ConflictReason, ScoreBreakdown};
use crate::models::job::{GeoPoint, Job, JobStatus};
use crate::models::service::{ServiceTypeConfig, ServiceWeights};
use crate::models::window::{gap_minutes, TimeWindow};
use crate::models::worker::Worker;
use crate::store::{JobFilter, Repository, WorkerFilter};

pub const MAX_SCORE: f64 = 100.0;
pub const NEUTRAL_SCORE: f64 = 50.0;
const CONTINUITY_DECAY: f64 = 0.25;

#[derive(Debug, Clone)]
pub struct ScoringSettings {
    /// Upper bound on concurrent availability checks per call.
    pub concurrency: usize,
    pub default_deadline: Duration,
    /// Slack between commitments at which the SLA score saturates.
    pub sla_comfort_minutes: f64,
    /// Distance at which the route score halves.
    pub route_scale_km: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            concurrency: 8,
            default_deadline: Duration::from_millis(2_000),
            sla_comfort_minutes: 120.0,
            route_scale_km: 10.0,
        }
    }
}

/// Per-call snapshot shared by every candidate in one `alternatives` run.
#[derive(Debug, Clone)]
pub struct ScoringContext {
    pub weights: ServiceWeights,
    pub required_skill_ids: Vec<Uuid>,
    pub period: TimeWindow,
    /// Open jobs of the cohort inside `period`, excluding the job being scored.
    pub schedule: Vec<Job>,
    /// Completed jobs per worker for the job's customer.
    pub customer_history: HashMap<Uuid, u32>,
    pub cohort_hours: HashMap<Uuid, f64>,
    pub deadline: Option<Instant>,
}

impl ScoringContext {
    fn committed_jobs_on_day(&self, worker_id: Uuid, day: TimeWindow) -> impl Iterator<Item = &Job> {
        self.schedule.iter().filter(move |job| {
            JobStatus::COMMITTED.contains(&job.status)
                && job.is_assigned_to(&worker_id)
                && job.window.overlaps(&day)
        })
    }

    /// The committed jobs immediately before and after `window` on its day.
    pub fn neighbors(&self, worker_id: &Uuid, window: &TimeWindow) -> (Option<&Job>, Option<&Job>) {
        let day = TimeWindow::day(window.start().date_naive());
        let mut before: Option<&Job> = None;
        let mut after: Option<&Job> = None;

        for job in self.committed_jobs_on_day(*worker_id, day) {
            if job.window.end() <= window.start()
                && before.is_none_or(|b| job.window.end() > b.window.end())
            {
                before = Some(job);
            }
            if job.window.start() >= window.end()
                && after.is_none_or(|a| job.window.start() < a.window.start())
            {
                after = Some(job);
            }
        }
        (before, after)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredWorker {
    pub worker_id: Uuid,
    pub worker_name: String,
    #[serde(rename = "score")]
    pub total_score: f64,
    pub breakdown: ScoreBreakdown,
    pub is_available: bool,
    pub availability_issues: Vec<ConflictReason>,
    pub passed: bool,
    #[serde(rename = "hardFilterReasons")]
    pub fail_reasons: Vec<String>,
    pub is_current: bool,
}

#[derive(Clone)]
pub struct ScoringEngine {
    repo: Arc<dyn Repository>,
    geocoder: Arc<dyn Geocoder>,
    availability: AvailabilityChecker,
    settings: ScoringSettings,
}

impl ScoringEngine {
    pub fn new(
        repo: Arc<dyn Repository>,
        geocoder: Arc<dyn Geocoder>,
        settings: ScoringSettings,
    ) -> Self {
        Self {
            availability: AvailabilityChecker::new(repo.clone()),
            repo,
            geocoder,
            settings,
        }
    }

    /// Ranked alternatives for a stored job. `worker_ids: None` means every
    /// active worker of the job's provider.
    pub async fn alternatives_for_job(
        &self,
        job_id: Uuid,
        worker_ids: Option<&[Uuid]>,
        deadline: Option<Duration>,
    ) -> Result<Vec<ScoredWorker>, AppError> {
        let job = self
            .repo
            .get_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;

        let workers = match worker_ids {
            Some(ids) => self.resolve_workers(job.provider_id, ids).await?,
            None => {
                self.repo
                    .list_workers(job.provider_id, &WorkerFilter::active())
                    .await?
            }
        };

        self.alternatives(job, &workers, deadline).await
    }

    pub async fn alternatives(
        &self,
        job: Job,
        workers: &[Worker],
        deadline: Option<Duration>,
    ) -> Result<Vec<ScoredWorker>, AppError> {
        if job.status.is_terminal() {
            return Err(AppError::InvalidInput(format!(
                "job {} is {}, nothing to schedule",
                job.id, job.status
            )));
        }

        let deadline = Instant::now() + deadline.unwrap_or(self.settings.default_deadline);
        let job = self.ensure_location(job, deadline).await?;
        let context = self.load_context(&job, workers, Some(deadline)).await?;

        let job = &job;
        let context = &context;
        let mut scored: Vec<ScoredWorker> = stream::iter(workers.to_vec())
            .map(|worker| async move { self.score(job, &worker, context).await })
            .buffered(self.settings.concurrency.max(1))
            .try_collect()
            .await?;

        rank(&mut scored);

        info!(
            job_id = %job.id,
            candidates = scored.len(),
            passed = scored.iter().filter(|s| s.passed).count(),
            "alternatives computed"
        );

        Ok(scored)
    }

    /// Hard filters, then the weighted soft score when every filter passes.
    pub async fn score(
        &self,
        job: &Job,
        worker: &Worker,
        context: &ScoringContext,
    ) -> Result<ScoredWorker, AppError> {
        let mut fail_reasons = Vec::new();

        if !worker.is_active() {
            fail_reasons.push(format!("worker is {}", worker.status));
        }
        if !worker.has_any_skill(&context.required_skill_ids) {
            fail_reasons.push(format!("missing a required skill for {}", job.service_type));
        }
        if !worker.works_during(&job.window) {
            fail_reasons.push("outside working hours".to_string());
        }

        let availability = self.check_availability(job, worker, context.deadline).await?;
        let (is_available, availability_issues) = match availability {
            Some(Availability {
                available,
                conflicts,
            }) => {
                if !available {
                    fail_reasons.push(format!("unavailable: {} conflict(s)", conflicts.len()));
                }
                (available, conflicts)
            }
            None => {
                warn!(job_id = %job.id, worker_id = %worker.id, "availability check abandoned at deadline");
                fail_reasons.push("availability unknown: deadline exceeded".to_string());
                (false, Vec::new())
            }
        };

        let passed = fail_reasons.is_empty();
        let (total_score, breakdown) = if passed {
            let breakdown = self.breakdown(job, worker, context);
            (weighted_score(&breakdown, &context.weights), breakdown)
        } else {
            (0.0, ScoreBreakdown::default())
        };

        Ok(ScoredWorker {
            worker_id: worker.id,
            worker_name: worker.name.clone(),
            total_score,
            breakdown,
            is_available,
            availability_issues,
            passed,
            fail_reasons,
            is_current: job.is_assigned_to(&worker.id),
        })
    }

    pub fn breakdown(&self, job: &Job, worker: &Worker, context: &ScoringContext) -> ScoreBreakdown {
        let (before, after) = context.neighbors(&worker.id, &job.window);

        ScoreBreakdown {
            sla: sla_score(job, before, after, self.settings.sla_comfort_minutes),
            route: route_score(job, before, after, self.settings.route_scale_km),
            continuity: continuity_score(&worker.id, &context.customer_history),
            balance: balance_score(&worker.id, &context.cohort_hours),
        }
    }

    /// Loads everything the soft scores need in one pass: weights, the
    /// cohort's schedule for the job's week and the customer's history.
    pub async fn load_context(
        &self,
        job: &Job,
        workers: &[Worker],
        deadline: Option<Instant>,
    ) -> Result<ScoringContext, AppError> {
        let config = self
            .repo
            .get_service_config(job.provider_id, &job.service_type)
            .await?
            .unwrap_or_else(|| ServiceTypeConfig::fallback(job.provider_id, &job.service_type));

        let period = TimeWindow::week_of(job.window.start().date_naive());
        let worker_ids: Vec<Uuid> = workers.iter().map(|w| w.id).collect();

        let schedule = if worker_ids.is_empty() {
            Vec::new()
        } else {
            let filter = JobFilter {
                worker_ids: Some(worker_ids.clone()),
                window: Some(period),
                statuses: Some(JobStatus::OPEN.to_vec()),
                customer_id: None,
                exclude_job_ids: vec![job.id],
            };
            self.repo.list_jobs(job.provider_id, &filter).await?
        };

        let mut customer_history: HashMap<Uuid, u32> = HashMap::new();
        if let Some(customer_id) = job.customer_id {
            let filter = JobFilter {
                statuses: Some(vec![JobStatus::Completed]),
                customer_id: Some(customer_id),
                exclude_job_ids: vec![job.id],
                ..JobFilter::default()
            };
            for past in self.repo.list_jobs(job.provider_id, &filter).await? {
                for worker_id in &past.assigned_worker_ids {
                    *customer_history.entry(*worker_id).or_default() += 1;
                }
            }
        }

        let cohort_hours = worker_ids
            .iter()
            .map(|worker_id| (*worker_id, scheduled_hours(worker_id, &schedule, &period)))
            .collect();

        Ok(ScoringContext {
            weights: config.weights.normalized(),
            required_skill_ids: config.required_skill_ids,
            period,
            schedule,
            customer_history,
            cohort_hours,
            deadline,
        })
    }

    async fn check_availability(
        &self,
        job: &Job,
        worker: &Worker,
        deadline: Option<Instant>,
    ) -> Result<Option<Availability>, AppError> {
        let exclude = [job.id];
        let check = self.availability.check_worker(worker, &job.window, &exclude);
        match deadline {
            Some(deadline) => match timeout_at(deadline, check).await {
                Ok(result) => result.map(Some),
                Err(_) => Ok(None),
            },
            None => check.await.map(Some),
        }
    }

    /// Geocodes a job without coordinates. Any failure leaves the job as-is.
    async fn ensure_location(&self, job: Job, deadline: Instant) -> Result<Job, AppError> {
        if job.location.is_some() {
            return Ok(job);
        }
        let Some(address) = job.address.clone() else {
            return Ok(job);
        };

        match timeout_at(deadline, self.geocoder.geocode(&address)).await {
            Ok(Ok(Some(hit))) => {
                self.repo
                    .set_job_location(job.id, hit.point, hit.zone_code.clone())
                    .await?;
                info!(job_id = %job.id, zone = ?hit.zone_code, "job geocoded");

                let mut updated = job;
                updated.location = Some(hit.point);
                if hit.zone_code.is_some() {
                    updated.zone_code = hit.zone_code;
                }
                Ok(updated)
            }
            Ok(Ok(None)) => {
                warn!(job_id = %job.id, "address could not be geocoded; using neutral route score");
                Ok(job)
            }
            Ok(Err(err)) => {
                warn!(job_id = %job.id, error = %err, "geocoding failed; using neutral route score");
                Ok(job)
            }
            Err(_) => {
                warn!(job_id = %job.id, "geocoding timed out; using neutral route score");
                Ok(job)
            }
        }
    }

    async fn resolve_workers(&self, provider_id: Uuid, ids: &[Uuid]) -> Result<Vec<Worker>, AppError> {
        let mut seen = HashSet::new();
        let mut workers = Vec::with_capacity(ids.len());
        for id in ids {
            if !seen.insert(*id) {
                continue;
            }
            let worker = self
                .repo
                .get_worker(*id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("worker {id} not found")))?;
            if worker.provider_id != provider_id {
                return Err(AppError::InvalidInput(format!(
                    "worker {id} belongs to another provider"
                )));
            }
            workers.push(worker);
        }
        Ok(workers)
    }
}

/// Passed first, then by score descending. Stable, so equal entries keep
/// their enumeration order.
pub fn rank(scored: &mut [ScoredWorker]) {
    scored.sort_by(|a, b| {
        b.passed
            .cmp(&a.passed)
            .then_with(|| b.total_score.total_cmp(&a.total_score))
    });
}

pub fn weighted_score(breakdown: &ScoreBreakdown, weights: &ServiceWeights) -> f64 {
    let w = weights.normalized();
    (breakdown.sla * w.sla)
        + (breakdown.route * w.route)
        + (breakdown.continuity * w.continuity)
        + (breakdown.balance * w.balance)
}

fn travel_between(a: Option<GeoPoint>, b: Option<GeoPoint>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => travel_minutes(&a, &b),
        _ => 0.0,
    }
}

/// Tightest slack (gap minus travel) on either side of the job, scaled
/// against `comfort_minutes`. Negative slack scores 0, no neighbors score 100.
pub fn sla_score(job: &Job, before: Option<&Job>, after: Option<&Job>, comfort_minutes: f64) -> f64 {
    let slack_before = before.map(|prev| {
        gap_minutes(&prev.window, &job.window) as f64 - travel_between(prev.location, job.location)
    });
    let slack_after = after.map(|next| {
        gap_minutes(&job.window, &next.window) as f64 - travel_between(job.location, next.location)
    });

    let slack = match (slack_before, slack_after) {
        (None, None) => return MAX_SCORE,
        (Some(s), None) | (None, Some(s)) => s,
        (Some(a), Some(b)) => a.min(b),
    };

    if comfort_minutes <= 0.0 {
        return if slack >= 0.0 { MAX_SCORE } else { 0.0 };
    }
    (slack / comfort_minutes).clamp(0.0, 1.0) * MAX_SCORE
}

/// Distance from the neighbor closest in time. Unknown coordinates are neutral.
pub fn route_score(job: &Job, before: Option<&Job>, after: Option<&Job>, scale_km: f64) -> f64 {
    let Some(target) = job.location else {
        return NEUTRAL_SCORE;
    };

    let nearest = match (before, after) {
        (None, None) => return MAX_SCORE,
        (Some(b), None) => b,
        (None, Some(a)) => a,
        (Some(b), Some(a)) => {
            if gap_minutes(&job.window, &a.window) < gap_minutes(&b.window, &job.window) {
                a
            } else {
                b
            }
        }
    };

    let Some(origin) = nearest.location else {
        return NEUTRAL_SCORE;
    };

    let distance = haversine_km(&origin, &target);
    let scale = if scale_km > 0.0 { scale_km } else { 1.0 };
    MAX_SCORE / (1.0 + distance / scale)
}

/// 100 for a returning worker, decaying with how many other workers also
/// served the customer. Strangers score 0 once a history exists.
pub fn continuity_score(worker_id: &Uuid, history: &HashMap<Uuid, u32>) -> f64 {
    if history.is_empty() {
        return NEUTRAL_SCORE;
    }
    if !history.contains_key(worker_id) {
        return 0.0;
    }
    let others = (history.len() - 1) as f64;
    MAX_SCORE / (1.0 + CONTINUITY_DECAY * others)
}

/// Min-max scaled against the cohort: least loaded 100, most loaded 0.
pub fn balance_score(worker_id: &Uuid, cohort_hours: &HashMap<Uuid, f64>) -> f64 {
    let hours = cohort_hours.get(worker_id).copied().unwrap_or(0.0);
    let min = cohort_hours.values().copied().fold(f64::INFINITY, f64::min).min(hours);
    let max = cohort_hours.values().copied().fold(f64::NEG_INFINITY, f64::max).max(hours);

    let spread = max - min;
    if spread < 1e-9 {
        return MAX_SCORE;
    }
    (max - hours) / spread * MAX_SCORE
}

fn scheduled_hours(worker_id: &Uuid, schedule: &[Job], period: &TimeWindow) -> f64 {
    schedule
        .iter()
        .filter(|job| job.is_assigned_to(worker_id))
        .filter_map(|job| job.window.intersection(period))
        .map(|overlap| overlap.duration_hours())
        .sum()
}
