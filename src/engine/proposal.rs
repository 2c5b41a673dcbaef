use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::availability::AvailabilityChecker;
use crate::error::AppError;
use crate::models::assignment::{AssignmentConflict, AssignmentIssue};
use crate::models::job::dedup_worker_ids;
use crate::models::proposal::{
    ProposalEvent, ProposalStatus, ProposedAssignment, ScheduleProposal, ScheduleSnapshot,
};
use crate::models::window::TimeWindow;
use crate::store::{Clock, CommitOutcome, Repository};

#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub job_id: Uuid,
    pub worker_ids: Vec<Uuid>,
    pub window: TimeWindow,
}

#[derive(Debug, Clone)]
pub struct NewProposal {
    pub provider_id: Uuid,
    pub created_by: Option<Uuid>,
    pub assignments: Vec<NewAssignment>,
    /// Move straight to `pending` instead of staying a draft.
    pub submit: bool,
}

/// `draft -> pending -> approved | rejected`. Approval is the only path that
/// writes job assignments, and it is serialized per provider.
pub struct ProposalWorkflow {
    repo: Arc<dyn Repository>,
    clock: Arc<dyn Clock>,
    availability: AvailabilityChecker,
    approval_gates: DashMap<Uuid, Arc<Mutex<()>>>,
    events_tx: broadcast::Sender<ProposalEvent>,
}

impl ProposalWorkflow {
    pub fn new(
        repo: Arc<dyn Repository>,
        clock: Arc<dyn Clock>,
        events_tx: broadcast::Sender<ProposalEvent>,
    ) -> Self {
        Self {
            availability: AvailabilityChecker::new(repo.clone()),
            repo,
            clock,
            approval_gates: DashMap::new(),
            events_tx,
        }
    }

    pub async fn get(&self, proposal_id: Uuid) -> Result<ScheduleProposal, AppError> {
        self.repo
            .get_proposal(proposal_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("proposal {proposal_id} not found")))
    }

    /// Records the assignments with a baseline of each target job. No job is touched.
    pub async fn create(&self, request: NewProposal) -> Result<ScheduleProposal, AppError> {
        if request.assignments.is_empty() {
            return Err(AppError::InvalidInput(
                "a proposal needs at least one assignment".to_string(),
            ));
        }

        let mut seen_jobs = HashSet::new();
        let mut assignments = Vec::with_capacity(request.assignments.len());

        for entry in request.assignments {
            if !seen_jobs.insert(entry.job_id) {
                return Err(AppError::InvalidInput(format!(
                    "job {} appears more than once",
                    entry.job_id
                )));
            }

            let worker_ids = dedup_worker_ids(&entry.worker_ids);
            if worker_ids.is_empty() {
                return Err(AppError::InvalidInput(format!(
                    "assignment for job {} has no workers",
                    entry.job_id
                )));
            }

            let job = self
                .repo
                .get_job(entry.job_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("job {} not found", entry.job_id)))?;
            if job.provider_id != request.provider_id {
                return Err(AppError::InvalidInput(format!(
                    "job {} belongs to another provider",
                    job.id
                )));
            }
            if job.status.is_terminal() {
                return Err(AppError::InvalidInput(format!(
                    "job {} is {}",
                    job.id, job.status
                )));
            }

            for worker_id in &worker_ids {
                let worker = self
                    .repo
                    .get_worker(*worker_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("worker {worker_id} not found")))?;
                if worker.provider_id != request.provider_id {
                    return Err(AppError::InvalidInput(format!(
                        "worker {worker_id} belongs to another provider"
                    )));
                }
            }

            if (worker_ids.len() as u32) < job.crew_size_required {
                warn!(
                    job_id = %job.id,
                    required = job.crew_size_required,
                    proposed = worker_ids.len(),
                    "proposed crew is smaller than required"
                );
            }

            assignments.push(ProposedAssignment {
                job_id: job.id,
                worker_ids,
                window: entry.window,
                baseline: ScheduleSnapshot::of(&job),
            });
        }

        let proposal = ScheduleProposal {
            id: Uuid::new_v4(),
            provider_id: request.provider_id,
            status: if request.submit {
                ProposalStatus::Pending
            } else {
                ProposalStatus::Draft
            },
            assignments,
            created_by: request.created_by,
            created_at: self.clock.now(),
            reviewed_by: None,
            reviewed_at: None,
        };

        self.repo.save_proposal(proposal.clone()).await?;

        info!(
            proposal_id = %proposal.id,
            provider_id = %proposal.provider_id,
            assignments = proposal.assignments.len(),
            status = %proposal.status,
            "proposal created"
        );
        let _ = self.events_tx.send(ProposalEvent::Created {
            proposal_id: proposal.id,
            status: proposal.status,
        });

        Ok(proposal)
    }

    pub async fn submit(&self, proposal_id: Uuid) -> Result<ScheduleProposal, AppError> {
        let proposal = self.get(proposal_id).await?;
        let gate = self.gate(proposal.provider_id);
        let _guard = gate.lock().await;

        let current = self.get(proposal_id).await?;
        let submitted = current.transitioned(ProposalStatus::Pending, None, self.clock.now())?;
        self.repo.save_proposal(submitted.clone()).await?;

        info!(proposal_id = %proposal_id, "proposal submitted");
        let _ = self
            .events_tx
            .send(ProposalEvent::Submitted { proposal_id });

        Ok(submitted)
    }

    /// Re-validates every assignment, then applies all of them in one commit.
    /// On any conflict nothing is written and the proposal stays pending.
    pub async fn approve(
        &self,
        proposal_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<ScheduleProposal, AppError> {
        let proposal = self.get(proposal_id).await?;
        let gate = self.gate(proposal.provider_id);
        let _guard = gate.lock().await;

        let current = self.get(proposal_id).await?;
        let now = self.clock.now();
        let approved = current.transitioned(ProposalStatus::Approved, Some(reviewer_id), now)?;

        let conflicts = self.revalidate(&current).await?;
        if !conflicts.is_empty() {
            warn!(
                proposal_id = %proposal_id,
                conflicts = conflicts.len(),
                "approval blocked by new conflicts"
            );
            return Err(AppError::StateConflict {
                message: format!(
                    "{} assignment conflict(s) found while re-validating proposal {proposal_id}",
                    conflicts.len()
                ),
                conflicts,
            });
        }

        match self.repo.commit_proposal(approved.clone(), now).await? {
            CommitOutcome::Committed => {
                info!(
                    proposal_id = %proposal_id,
                    reviewer_id = %reviewer_id,
                    assignments = approved.assignments.len(),
                    "proposal approved"
                );
                let _ = self.events_tx.send(ProposalEvent::Approved {
                    proposal_id,
                    reviewer_id,
                });
                Ok(approved)
            }
            CommitOutcome::Stale(conflicts) => {
                warn!(
                    proposal_id = %proposal_id,
                    stale = conflicts.len(),
                    "approval aborted: target jobs changed since drafting"
                );
                Err(AppError::StateConflict {
                    message: format!(
                        "{} job(s) changed since proposal {proposal_id} was drafted",
                        conflicts.len()
                    ),
                    conflicts,
                })
            }
        }
    }

    pub async fn reject(
        &self,
        proposal_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<ScheduleProposal, AppError> {
        let proposal = self.get(proposal_id).await?;
        let gate = self.gate(proposal.provider_id);
        let _guard = gate.lock().await;

        let current = self.get(proposal_id).await?;
        let rejected =
            current.transitioned(ProposalStatus::Rejected, Some(reviewer_id), self.clock.now())?;
        self.repo.save_proposal(rejected.clone()).await?;

        info!(proposal_id = %proposal_id, reviewer_id = %reviewer_id, "proposal rejected");
        let _ = self.events_tx.send(ProposalEvent::Rejected {
            proposal_id,
            reviewer_id,
        });

        Ok(rejected)
    }

    /// Conflicts the proposal would introduce against the current calendar,
    /// including double-booking between its own assignments.
    pub async fn revalidate(
        &self,
        proposal: &ScheduleProposal,
    ) -> Result<Vec<AssignmentConflict>, AppError> {
        let moving = proposal.job_ids();
        let mut conflicts = Vec::new();

        for assignment in &proposal.assignments {
            for worker_id in &assignment.worker_ids {
                let Some(worker) = self.repo.get_worker(*worker_id).await? else {
                    conflicts.push(AssignmentConflict {
                        job_id: assignment.job_id,
                        worker_id: Some(*worker_id),
                        issue: AssignmentIssue::Stale {
                            detail: "worker no longer exists".to_string(),
                        },
                    });
                    continue;
                };
                if !worker.is_active() {
                    conflicts.push(AssignmentConflict {
                        job_id: assignment.job_id,
                        worker_id: Some(*worker_id),
                        issue: AssignmentIssue::Stale {
                            detail: format!("worker is {}", worker.status),
                        },
                    });
                }

                let availability = self
                    .availability
                    .check_worker(&worker, &assignment.window, &moving)
                    .await?;
                conflicts.extend(availability.conflicts.into_iter().map(|reason| {
                    AssignmentConflict {
                        job_id: assignment.job_id,
                        worker_id: Some(*worker_id),
                        issue: AssignmentIssue::Unavailable(reason),
                    }
                }));
            }
        }

        for (i, first) in proposal.assignments.iter().enumerate() {
            for second in &proposal.assignments[i + 1..] {
                if !first.window.overlaps(&second.window) {
                    continue;
                }
                for worker_id in second
                    .worker_ids
                    .iter()
                    .filter(|id| first.worker_ids.contains(id))
                {
                    conflicts.push(AssignmentConflict {
                        job_id: second.job_id,
                        worker_id: Some(*worker_id),
                        issue: AssignmentIssue::OverlapsWithinProposal {
                            other_job_id: first.job_id,
                        },
                    });
                }
            }
        }

        Ok(conflicts)
    }

    fn gate(&self, provider_id: Uuid) -> Arc<Mutex<()>> {
        self.approval_gates
            .entry(provider_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
