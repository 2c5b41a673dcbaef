use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc, Weekday};
use crew_dispatch::engine::availability::AvailabilityChecker;
use crew_dispatch::engine::proposal::{NewAssignment, NewProposal, ProposalWorkflow};
use crew_dispatch::engine::scoring::{ScoredWorker, ScoringEngine, ScoringSettings, NEUTRAL_SCORE};
use crew_dispatch::error::AppError;
use crew_dispatch::geo::{NoopGeocoder, StaticGeocoder};
use crew_dispatch::models::assignment::{AssignmentIssue, ConflictReason};
use crew_dispatch::models::blocked_time::{BlockSchedule, BlockedTime, RecurrenceEnd};
use crew_dispatch::models::crew::Crew;
use crew_dispatch::models::job::{GeoPoint, Job, JobStatus};
use crew_dispatch::models::proposal::{ProposalStatus, ScheduleProposal};
use crew_dispatch::models::service::{ServiceTypeConfig, ServiceWeights};
use crew_dispatch::models::window::TimeWindow;
use crew_dispatch::models::worker::{SkillLevel, Worker, WorkerMetrics, WorkerStatus};
use crew_dispatch::store::memory::InMemoryRepository;
use crew_dispatch::store::{
    CommitOutcome, FixedClock, JobFilter, Repository, StoreStats, WorkerFilter,
};
use tokio::sync::broadcast;
use uuid::Uuid;

const PROVIDER: u128 = 0xA0;
const MOWING: u128 = 0x5;

fn id(raw: u128) -> Uuid {
    Uuid::from_u128(raw)
}

fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, day, hour, minute, 0).unwrap()
}

fn window(day: u32, start: (u32, u32), end: (u32, u32)) -> TimeWindow {
    TimeWindow::new(at(day, start.0, start.1), at(day, end.0, end.1)).unwrap()
}

fn worker(raw: u128, name: &str) -> Worker {
    Worker {
        id: id(raw),
        provider_id: id(PROVIDER),
        name: name.to_string(),
        status: WorkerStatus::Active,
        skills: vec![SkillLevel {
            skill_id: id(MOWING),
            proficiency: 3,
        }],
        working_hours: Vec::new(),
        metrics: WorkerMetrics::default(),
        updated_at: at(1, 0, 0),
    }
}

fn job(raw: u128, w: TimeWindow, status: JobStatus, workers: &[u128]) -> Job {
    Job {
        id: id(raw),
        provider_id: id(PROVIDER),
        customer_id: None,
        customer_name: None,
        service_type: "landscaping".to_string(),
        window: w,
        address: None,
        location: None,
        zone_code: None,
        status,
        assigned_worker_ids: workers.iter().map(|w| id(*w)).collect(),
        priority: 0,
        crew_size_required: 1,
        updated_at: at(1, 0, 0),
    }
}

fn landscaping_config(weights: ServiceWeights) -> ServiceTypeConfig {
    ServiceTypeConfig {
        provider_id: id(PROVIDER),
        service_type: "landscaping".to_string(),
        weights,
        required_skill_ids: vec![id(MOWING)],
    }
}

fn engine(repo: Arc<InMemoryRepository>) -> ScoringEngine {
    ScoringEngine::new(repo, Arc::new(NoopGeocoder), ScoringSettings::default())
}

fn workflow(repo: Arc<dyn Repository>) -> ProposalWorkflow {
    let clock = Arc::new(FixedClock::new(at(1, 7, 0)));
    let (events_tx, _rx) = broadcast::channel(16);
    ProposalWorkflow::new(repo, clock, events_tx)
}

fn summary(scored: &[ScoredWorker]) -> Vec<(Uuid, bool, f64)> {
    scored
        .iter()
        .map(|s| (s.worker_id, s.passed, s.total_score))
        .collect()
}

#[tokio::test]
async fn landscaping_scenario_ranks_free_worker_first() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.insert_service_config(landscaping_config(ServiceWeights::default()));
    repo.insert_worker(worker(1, "W1"));
    repo.insert_worker(worker(2, "W2"));
    repo.insert_job(job(100, window(1, (9, 0), (11, 0)), JobStatus::PendingApproval, &[]))
        .unwrap();
    repo.insert_job(job(101, window(1, (9, 30), (10, 30)), JobStatus::Scheduled, &[2]))
        .unwrap();

    let scored = engine(repo)
        .alternatives_for_job(id(100), Some(&[id(1), id(2)]), None)
        .await
        .unwrap();

    assert_eq!(scored.len(), 2);
    assert_eq!(scored[0].worker_id, id(1));
    assert!(scored[0].passed);
    assert!(scored[0].total_score > 0.0);

    assert_eq!(scored[1].worker_id, id(2));
    assert!(!scored[1].passed);
    assert_eq!(scored[1].total_score, 0.0);
    assert!(matches!(
        scored[1].availability_issues.as_slice(),
        [ConflictReason::Booked { job_id, .. }] if *job_id == id(101)
    ));
}

#[tokio::test]
async fn unskilled_worker_fails_hard_filter_but_is_listed() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.insert_service_config(landscaping_config(ServiceWeights::default()));
    let mut novice = worker(3, "Novice");
    novice.skills.clear();
    repo.insert_worker(novice);
    repo.insert_job(job(100, window(1, (9, 0), (11, 0)), JobStatus::PendingApproval, &[]))
        .unwrap();

    let scored = engine(repo)
        .alternatives_for_job(id(100), None, None)
        .await
        .unwrap();

    assert_eq!(scored.len(), 1);
    assert!(!scored[0].passed);
    assert!(scored[0].is_available);
    assert!(scored[0].fail_reasons[0].contains("required skill"));
}

#[tokio::test]
async fn alternatives_are_repeatable_for_unchanged_data() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.insert_service_config(landscaping_config(ServiceWeights::default()));
    for raw in 1..=6 {
        repo.insert_worker(worker(raw, &format!("W{raw}")));
    }
    repo.insert_job(job(100, window(2, (12, 0), (14, 0)), JobStatus::PendingApproval, &[]))
        .unwrap();
    repo.insert_job(job(101, window(2, (8, 0), (11, 0)), JobStatus::Scheduled, &[2]))
        .unwrap();
    repo.insert_job(job(102, window(3, (8, 0), (16, 0)), JobStatus::Scheduled, &[4]))
        .unwrap();
    repo.insert_job(job(103, window(2, (13, 0), (15, 0)), JobStatus::Scheduled, &[5]))
        .unwrap();

    let engine = engine(repo);
    let first = engine.alternatives_for_job(id(100), None, None).await.unwrap();
    let second = engine.alternatives_for_job(id(100), None, None).await.unwrap();

    assert_eq!(summary(&first), summary(&second));
    assert_eq!(first.len(), 6);
    assert!(!first.last().unwrap().passed);
}

#[tokio::test]
async fn raising_balance_weight_favours_less_loaded_worker() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.insert_worker(worker(1, "Heavy"));
    repo.insert_worker(worker(2, "Light"));
    repo.insert_job(job(100, window(2, (10, 0), (11, 0)), JobStatus::PendingApproval, &[]))
        .unwrap();
    repo.insert_job(job(101, window(4, (9, 0), (13, 0)), JobStatus::Scheduled, &[1]))
        .unwrap();

    let engine = engine(repo.clone());
    let candidates = [id(1), id(2)];

    let mut gaps = Vec::new();
    for balance in [0.0, 0.2, 0.6] {
        repo.insert_service_config(landscaping_config(ServiceWeights {
            sla: 0.3,
            route: 0.3,
            continuity: 0.2,
            balance,
        }));
        let scored = engine
            .alternatives_for_job(id(100), Some(&candidates), None)
            .await
            .unwrap();
        let score_of = |raw: u128| {
            scored
                .iter()
                .find(|s| s.worker_id == id(raw))
                .map(|s| s.total_score)
                .unwrap()
        };
        if balance == 0.0 {
            assert_eq!(scored[0].worker_id, id(1), "ties keep enumeration order");
        } else {
            assert_eq!(scored[0].worker_id, id(2));
        }
        gaps.push(score_of(2) - score_of(1));
    }

    assert_eq!(gaps[0], 0.0);
    assert!(gaps[1] > gaps[0]);
    assert!(gaps[2] > gaps[1]);
}

#[tokio::test]
async fn unresolved_address_scores_route_neutral() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.insert_worker(worker(1, "W1"));
    let mut target = job(100, window(2, (10, 0), (11, 0)), JobStatus::PendingApproval, &[]);
    target.address = Some("nowhere lane".to_string());
    repo.insert_job(target).unwrap();
    let mut earlier = job(101, window(2, (7, 0), (8, 0)), JobStatus::Scheduled, &[1]);
    earlier.location = Some(GeoPoint {
        lat: 52.52,
        lng: 13.40,
    });
    repo.insert_job(earlier).unwrap();

    let scored = engine(repo.clone())
        .alternatives_for_job(id(100), None, None)
        .await
        .unwrap();

    assert!(scored[0].passed);
    assert_eq!(scored[0].breakdown.route, NEUTRAL_SCORE);
    assert!(repo.get_job(id(100)).await.unwrap().unwrap().location.is_none());
}

#[tokio::test]
async fn geocoded_location_is_written_back() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.insert_worker(worker(1, "W1"));
    let mut target = job(100, window(2, (10, 0), (11, 0)), JobStatus::PendingApproval, &[]);
    target.address = Some("1 Garden Row".to_string());
    repo.insert_job(target).unwrap();

    let point = GeoPoint {
        lat: 48.85,
        lng: 2.35,
    };
    let geocoder = StaticGeocoder::new().with("1 Garden Row", point, Some("Z-7"));
    let engine = ScoringEngine::new(repo.clone(), Arc::new(geocoder), ScoringSettings::default());

    let scored = engine.alternatives_for_job(id(100), None, None).await.unwrap();
    assert!(scored[0].passed);

    let stored = repo.get_job(id(100)).await.unwrap().unwrap();
    assert_eq!(stored.location, Some(point));
    assert_eq!(stored.zone_code.as_deref(), Some("Z-7"));
    assert_eq!(stored.status, JobStatus::PendingApproval);
}

#[tokio::test]
async fn missed_deadline_excludes_worker_from_passing() {
    let inner = Arc::new(InMemoryRepository::new());
    inner.insert_worker(worker(1, "W1"));
    inner
        .insert_job(job(100, window(2, (10, 0), (11, 0)), JobStatus::PendingApproval, &[]))
        .unwrap();
    let repo = Arc::new(InterposedStore {
        inner,
        blocked_time_delay: Duration::from_millis(500),
        locate_before_commit: None,
    });

    let engine = ScoringEngine::new(repo, Arc::new(NoopGeocoder), ScoringSettings::default());
    let scored = engine
        .alternatives_for_job(id(100), None, Some(Duration::from_millis(50)))
        .await
        .unwrap();

    assert_eq!(scored.len(), 1);
    assert!(!scored[0].passed);
    assert!(!scored[0].is_available);
    assert!(scored[0]
        .fail_reasons
        .iter()
        .any(|reason| reason.contains("deadline exceeded")));
}

#[tokio::test]
async fn store_failure_aborts_alternatives() {
    let engine = ScoringEngine::new(
        Arc::new(UnavailableStore),
        Arc::new(NoopGeocoder),
        ScoringSettings::default(),
    );

    let err = engine
        .alternatives_for_job(id(100), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DependencyUnavailable(_)));
}

#[tokio::test]
async fn adjacent_booking_is_not_a_conflict() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.insert_worker(worker(1, "W1"));
    repo.insert_job(job(100, window(2, (10, 0), (11, 0)), JobStatus::Scheduled, &[1]))
        .unwrap();
    let checker = AvailabilityChecker::new(repo);

    let overlapping = checker
        .check(id(1), &window(2, (10, 30), (11, 30)), &[])
        .await
        .unwrap();
    assert!(!overlapping.available);

    let adjacent = checker
        .check(id(1), &window(2, (11, 0), (12, 0)), &[])
        .await
        .unwrap();
    assert!(adjacent.available);
    assert!(adjacent.conflicts.is_empty());
}

#[tokio::test]
async fn expired_recurring_block_stops_applying() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.insert_worker(worker(1, "W1"));
    repo.insert_blocked_time(BlockedTime {
        id: id(900),
        worker_id: id(1),
        reason: Some("evening class".to_string()),
        schedule: BlockSchedule::Recurring {
            starts_on: NaiveDate::from_ymd_opt(2025, 5, 5).unwrap(),
            days_of_week: vec![Weekday::Mon],
            ends: RecurrenceEnd::OnDate(NaiveDate::from_ymd_opt(2025, 5, 26).unwrap()),
        },
        start_time: None,
        end_time: None,
    });
    let checker = AvailabilityChecker::new(repo);

    let may_19 = TimeWindow::new(
        Utc.with_ymd_and_hms(2025, 5, 19, 9, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 5, 19, 10, 0, 0).unwrap(),
    )
    .unwrap();
    let blocked = checker.check(id(1), &may_19, &[]).await.unwrap();
    assert!(!blocked.available);
    assert!(matches!(
        blocked.conflicts.as_slice(),
        [ConflictReason::Blocked { blocked_time_id, .. }] if *blocked_time_id == id(900)
    ));

    // Monday after the end date.
    let free = checker
        .check(id(1), &window(2, (9, 0), (10, 0)), &[])
        .await
        .unwrap();
    assert!(free.available);
}

#[tokio::test]
async fn crew_availability_requires_every_member() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.insert_worker(worker(1, "W1"));
    repo.insert_worker(worker(2, "W2"));
    repo.insert_crew(Crew {
        id: id(50),
        provider_id: id(PROVIDER),
        name: "South".to_string(),
        member_ids: vec![id(1), id(2)],
    });
    let checker = AvailabilityChecker::new(repo.clone());
    let slot = window(2, (9, 0), (12, 0));

    let all_free = checker.check_crew(id(50), &slot, None).await.unwrap();
    assert!(all_free.all_available);
    assert!(!all_free.has_conflicts);

    repo.insert_blocked_time(BlockedTime {
        id: id(901),
        worker_id: id(2),
        reason: None,
        schedule: BlockSchedule::OneOff {
            from_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
        },
        start_time: None,
        end_time: None,
    });
    let blocked = checker.check_crew(id(50), &slot, None).await.unwrap();
    assert!(!blocked.all_available);
    assert!(!blocked.has_conflicts, "a blocked day is not a job conflict");

    repo.insert_job(job(100, window(2, (11, 0), (13, 0)), JobStatus::Scheduled, &[1]))
        .unwrap();
    let booked = checker.check_crew(id(50), &slot, None).await.unwrap();
    assert!(booked.has_conflicts);
    assert_eq!(booked.conflicts[0].job_id, id(100));
}

fn two_job_proposal() -> NewProposal {
    NewProposal {
        provider_id: id(PROVIDER),
        created_by: None,
        assignments: vec![
            NewAssignment {
                job_id: id(100),
                worker_ids: vec![id(1)],
                window: window(2, (9, 0), (10, 0)),
            },
            NewAssignment {
                job_id: id(101),
                worker_ids: vec![id(2)],
                window: window(2, (9, 0), (10, 0)),
            },
        ],
        submit: true,
    }
}

fn proposal_repo() -> Arc<InMemoryRepository> {
    let repo = Arc::new(InMemoryRepository::new());
    for raw in 1..=3 {
        repo.insert_worker(worker(raw, &format!("W{raw}")));
    }
    repo.insert_job(job(100, window(2, (9, 0), (10, 0)), JobStatus::PendingApproval, &[]))
        .unwrap();
    repo.insert_job(job(101, window(2, (9, 0), (10, 0)), JobStatus::PendingApproval, &[]))
        .unwrap();
    repo
}

#[tokio::test]
async fn failed_approval_leaves_every_job_untouched() {
    let repo = proposal_repo();
    let workflow = workflow(repo.clone());
    let proposal = workflow.create(two_job_proposal()).await.unwrap();
    let first_before = repo.get_job(id(100)).await.unwrap().unwrap();

    let mut reassigned = repo.get_job(id(101)).await.unwrap().unwrap();
    reassigned.assigned_worker_ids = vec![id(3)];
    reassigned.status = JobStatus::Scheduled;
    repo.save_job(reassigned).await.unwrap();

    let err = workflow.approve(proposal.id, id(77)).await.unwrap_err();
    match err {
        AppError::StateConflict { conflicts, .. } => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].job_id, id(101));
            assert!(matches!(conflicts[0].issue, AssignmentIssue::Stale { .. }));
        }
        other => panic!("expected state conflict, got {other:?}"),
    }

    let first_after = repo.get_job(id(100)).await.unwrap().unwrap();
    assert_eq!(first_after.assigned_worker_ids, first_before.assigned_worker_ids);
    assert_eq!(first_after.status, JobStatus::PendingApproval);
    assert_eq!(first_after.updated_at, first_before.updated_at);

    let stored = workflow.get(proposal.id).await.unwrap();
    assert_eq!(stored.status, ProposalStatus::Pending);
}

#[tokio::test]
async fn approval_keeps_location_geocoded_while_pending() {
    let inner = proposal_repo();
    let point = GeoPoint {
        lat: 30.27,
        lng: -97.74,
    };
    let repo = Arc::new(InterposedStore {
        inner: inner.clone(),
        blocked_time_delay: Duration::ZERO,
        locate_before_commit: Some((id(100), point)),
    });
    let workflow = workflow(repo);
    let proposal = workflow.create(two_job_proposal()).await.unwrap();

    workflow.approve(proposal.id, id(77)).await.unwrap();

    let approved_job = inner.get_job(id(100)).await.unwrap().unwrap();
    assert_eq!(approved_job.location, Some(point));
    assert_eq!(approved_job.zone_code.as_deref(), Some("Z-9"));
    assert_eq!(approved_job.assigned_worker_ids, vec![id(1)]);
    assert_eq!(approved_job.status, JobStatus::Scheduled);
}

#[tokio::test]
async fn second_approval_is_a_state_conflict() {
    let repo = proposal_repo();
    let workflow = workflow(repo.clone());
    let proposal = workflow.create(two_job_proposal()).await.unwrap();

    let approved = workflow.approve(proposal.id, id(77)).await.unwrap();
    assert_eq!(approved.status, ProposalStatus::Approved);
    assert_eq!(approved.reviewed_by, Some(id(77)));

    let jobs_after_first = (
        repo.get_job(id(100)).await.unwrap().unwrap(),
        repo.get_job(id(101)).await.unwrap().unwrap(),
    );
    assert_eq!(jobs_after_first.0.assigned_worker_ids, vec![id(1)]);
    assert_eq!(jobs_after_first.1.assigned_worker_ids, vec![id(2)]);

    let err = workflow.approve(proposal.id, id(78)).await.unwrap_err();
    assert!(matches!(err, AppError::StateConflict { .. }));

    let stored = workflow.get(proposal.id).await.unwrap();
    assert_eq!(stored.reviewed_by, Some(id(77)));
    assert_eq!(
        repo.get_job(id(100)).await.unwrap().unwrap().updated_at,
        jobs_after_first.0.updated_at
    );
}

#[tokio::test]
async fn concurrent_approvals_for_one_worker_admit_only_one() {
    let repo = proposal_repo();
    let workflow = Arc::new(workflow(repo.clone()));

    let single = |job_id: u128| NewProposal {
        provider_id: id(PROVIDER),
        created_by: None,
        assignments: vec![NewAssignment {
            job_id: id(job_id),
            worker_ids: vec![id(1)],
            window: window(2, (9, 0), (10, 0)),
        }],
        submit: true,
    };
    let a = workflow.create(single(100)).await.unwrap();
    let b = workflow.create(single(101)).await.unwrap();

    let (first, second) = tokio::join!(
        workflow.approve(a.id, id(77)),
        workflow.approve(b.id, id(77))
    );

    let outcomes = [first.is_ok(), second.is_ok()];
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);

    let booked = repo
        .list_jobs(
            id(PROVIDER),
            &JobFilter {
                worker_ids: Some(vec![id(1)]),
                ..JobFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(booked.len(), 1);
}

/// Delegates to the in-memory store. Blocked-time reads stall for
/// `blocked_time_delay`; a commit is preceded by a geocode write-back when
/// `locate_before_commit` is set.
struct InterposedStore {
    inner: Arc<InMemoryRepository>,
    blocked_time_delay: Duration,
    locate_before_commit: Option<(Uuid, GeoPoint)>,
}

#[async_trait]
impl Repository for InterposedStore {
    async fn get_job(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        self.inner.get_job(id).await
    }

    async fn list_jobs(&self, provider_id: Uuid, filter: &JobFilter) -> Result<Vec<Job>, AppError> {
        self.inner.list_jobs(provider_id, filter).await
    }

    async fn save_job(&self, job: Job) -> Result<(), AppError> {
        self.inner.save_job(job).await
    }

    async fn set_job_location(
        &self,
        job_id: Uuid,
        location: GeoPoint,
        zone_code: Option<String>,
    ) -> Result<(), AppError> {
        self.inner.set_job_location(job_id, location, zone_code).await
    }

    async fn get_worker(&self, id: Uuid) -> Result<Option<Worker>, AppError> {
        self.inner.get_worker(id).await
    }

    async fn list_workers(
        &self,
        provider_id: Uuid,
        filter: &WorkerFilter,
    ) -> Result<Vec<Worker>, AppError> {
        self.inner.list_workers(provider_id, filter).await
    }

    async fn get_crew(&self, id: Uuid) -> Result<Option<Crew>, AppError> {
        self.inner.get_crew(id).await
    }

    async fn list_blocked_times(
        &self,
        worker_id: Uuid,
        window: &TimeWindow,
    ) -> Result<Vec<BlockedTime>, AppError> {
        tokio::time::sleep(self.blocked_time_delay).await;
        self.inner.list_blocked_times(worker_id, window).await
    }

    async fn get_service_config(
        &self,
        provider_id: Uuid,
        service_type: &str,
    ) -> Result<Option<ServiceTypeConfig>, AppError> {
        self.inner.get_service_config(provider_id, service_type).await
    }

    async fn get_proposal(&self, id: Uuid) -> Result<Option<ScheduleProposal>, AppError> {
        self.inner.get_proposal(id).await
    }

    async fn save_proposal(&self, proposal: ScheduleProposal) -> Result<(), AppError> {
        self.inner.save_proposal(proposal).await
    }

    async fn commit_proposal(
        &self,
        proposal: ScheduleProposal,
        applied_at: DateTime<Utc>,
    ) -> Result<CommitOutcome, AppError> {
        if let Some((job_id, point)) = self.locate_before_commit {
            self.inner
                .set_job_location(job_id, point, Some("Z-9".to_string()))
                .await?;
        }
        self.inner.commit_proposal(proposal, applied_at).await
    }

    async fn stats(&self) -> Result<StoreStats, AppError> {
        self.inner.stats().await
    }
}

/// Every call fails as if the database were down.
struct UnavailableStore;

fn down<T>() -> Result<T, AppError> {
    Err(AppError::DependencyUnavailable("store offline".to_string()))
}

#[async_trait]
impl Repository for UnavailableStore {
    async fn get_job(&self, _id: Uuid) -> Result<Option<Job>, AppError> {
        down()
    }

    async fn list_jobs(&self, _provider_id: Uuid, _filter: &JobFilter) -> Result<Vec<Job>, AppError> {
        down()
    }

    async fn save_job(&self, _job: Job) -> Result<(), AppError> {
        down()
    }

    async fn set_job_location(
        &self,
        _job_id: Uuid,
        _location: GeoPoint,
        _zone_code: Option<String>,
    ) -> Result<(), AppError> {
        down()
    }

    async fn get_worker(&self, _id: Uuid) -> Result<Option<Worker>, AppError> {
        down()
    }

    async fn list_workers(
        &self,
        _provider_id: Uuid,
        _filter: &WorkerFilter,
    ) -> Result<Vec<Worker>, AppError> {
        down()
    }

    async fn get_crew(&self, _id: Uuid) -> Result<Option<Crew>, AppError> {
        down()
    }

    async fn list_blocked_times(
        &self,
        _worker_id: Uuid,
        _window: &TimeWindow,
    ) -> Result<Vec<BlockedTime>, AppError> {
        down()
    }

    async fn get_service_config(
        &self,
        _provider_id: Uuid,
        _service_type: &str,
    ) -> Result<Option<ServiceTypeConfig>, AppError> {
        down()
    }

    async fn get_proposal(&self, _id: Uuid) -> Result<Option<ScheduleProposal>, AppError> {
        down()
    }

    async fn save_proposal(&self, _proposal: ScheduleProposal) -> Result<(), AppError> {
        down()
    }

    async fn commit_proposal(
        &self,
        _proposal: ScheduleProposal,
        _applied_at: DateTime<Utc>,
    ) -> Result<CommitOutcome, AppError> {
        down()
    }

    async fn stats(&self) -> Result<StoreStats, AppError> {
        down()
    }
}
