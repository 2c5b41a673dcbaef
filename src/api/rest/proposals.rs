use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::rest::outcome_label;
use crate::engine::proposal::{NewAssignment, NewProposal};
use crate::error::AppError;
use crate::models::proposal::{ProposalStatus, ScheduleProposal};
use crate::models::window::TimeWindow;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/proposals", post(create_proposal))
        .route("/proposals/:id", get(get_proposal))
        .route("/proposals/:id/submit", post(submit_proposal))
        .route("/proposals/:id/approve", post(approve_proposal))
        .route("/proposals/:id/reject", post(reject_proposal))
}

#[derive(Debug, Deserialize)]
pub struct AssignmentRequest {
    pub job_id: Uuid,
    pub worker_ids: Vec<Uuid>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProposalRequest {
    pub provider_id: Uuid,
    pub created_by: Option<Uuid>,
    #[serde(default)]
    pub submit: bool,
    pub assignments: Vec<AssignmentRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub reviewer_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub success: bool,
    pub message: String,
    pub proposal: ScheduleProposal,
}

async fn create_proposal(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProposalRequest>,
) -> Result<Json<ScheduleProposal>, AppError> {
    let assignments = payload
        .assignments
        .into_iter()
        .map(|entry| {
            Ok(NewAssignment {
                job_id: entry.job_id,
                worker_ids: entry.worker_ids,
                window: TimeWindow::new(entry.start, entry.end)?,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let proposal = state
        .proposals
        .create(NewProposal {
            provider_id: payload.provider_id,
            created_by: payload.created_by,
            assignments,
            submit: payload.submit,
        })
        .await?;

    if proposal.status == ProposalStatus::Pending {
        state.metrics.pending_proposals.inc();
    }

    Ok(Json(proposal))
}

async fn get_proposal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduleProposal>, AppError> {
    Ok(Json(state.proposals.get(id).await?))
}

async fn submit_proposal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduleProposal>, AppError> {
    let proposal = state.proposals.submit(id).await?;
    state.metrics.pending_proposals.inc();

    Ok(Json(proposal))
}

async fn approve_proposal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<DecisionResponse>, AppError> {
    let result = state.proposals.approve(id, payload.reviewer_id).await;
    state
        .metrics
        .record_decision("approve", outcome_label(&result));

    let proposal = result?;
    state.metrics.pending_proposals.dec();

    Ok(Json(DecisionResponse {
        success: true,
        message: format!(
            "proposal approved, {} assignment(s) applied",
            proposal.assignments.len()
        ),
        proposal,
    }))
}

async fn reject_proposal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<DecisionResponse>, AppError> {
    let result = state.proposals.reject(id, payload.reviewer_id).await;
    state
        .metrics
        .record_decision("reject", outcome_label(&result));

    let proposal = result?;
    state.metrics.pending_proposals.dec();

    Ok(Json(DecisionResponse {
        success: true,
        message: "proposal rejected, no jobs changed".to_string(),
        proposal,
    }))
}
