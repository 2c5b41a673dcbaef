use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Path, State};
use axum::routing::post;
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::rest::outcome_label;
use crate::engine::availability::{Availability, CrewAvailability};
use crate::engine::conflicts::{conflict_message, JobConflict};
use crate::engine::scoring::ScoredWorker;
use crate::error::AppError;
use crate::models::window::TimeWindow;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/jobs/:id/alternatives", post(job_alternatives))
        .route("/workers/:id/availability", post(worker_availability))
        .route("/conflicts", post(find_conflicts))
        .route("/crews/:id/availability", post(crew_availability))
}

#[derive(Debug, Default, Deserialize)]
pub struct AlternativesRequest {
    /// Candidate pool; every active worker of the job's provider when absent.
    pub worker_ids: Option<Vec<Uuid>>,
    pub deadline_ms: Option<u64>,
}

async fn job_alternatives(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AlternativesRequest>,
) -> Result<Json<Vec<ScoredWorker>>, AppError> {
    let started = Instant::now();
    let result = state
        .scoring
        .alternatives_for_job(
            id,
            payload.worker_ids.as_deref(),
            payload.deadline_ms.map(Duration::from_millis),
        )
        .await;

    state
        .metrics
        .observe_scoring(outcome_label(&result), started.elapsed().as_secs_f64());

    Ok(Json(result?))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub duration_hours: Option<f64>,
    pub exclude_job_id: Option<Uuid>,
}

async fn worker_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AvailabilityRequest>,
) -> Result<Json<Availability>, AppError> {
    let exclude: Vec<Uuid> = payload.exclude_job_id.into_iter().collect();

    let availability = match (payload.end, payload.duration_hours) {
        (Some(end), _) => {
            let window = TimeWindow::new(payload.start, end)?;
            state.availability.check(id, &window, &exclude).await?
        }
        (None, Some(hours)) => {
            state
                .availability
                .check_for_duration(id, payload.start, hours, &exclude)
                .await?
        }
        (None, None) => {
            return Err(AppError::InvalidInput(
                "either end or duration_hours is required".to_string(),
            ));
        }
    };

    Ok(Json(availability))
}

#[derive(Debug, Deserialize)]
pub struct ConflictsRequest {
    pub provider_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub worker_ids: Vec<Uuid>,
    pub exclude_job_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictsResponse {
    pub has_conflicts: bool,
    pub conflicts: Vec<JobConflict>,
    pub message: String,
}

async fn find_conflicts(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ConflictsRequest>,
) -> Result<Json<ConflictsResponse>, AppError> {
    let window = TimeWindow::new(payload.start, payload.end)?;
    let conflicts = state
        .availability
        .conflict_detector()
        .find_conflicts(
            payload.provider_id,
            &window,
            &payload.worker_ids,
            payload.exclude_job_id,
        )
        .await?;

    let mut worker_names = HashMap::new();
    for conflict in &conflicts {
        for worker_id in &conflict.conflicting_worker_ids {
            if worker_names.contains_key(worker_id) {
                continue;
            }
            if let Some(worker) = state.repo.get_worker(*worker_id).await? {
                worker_names.insert(worker.id, worker.name);
            }
        }
    }

    Ok(Json(ConflictsResponse {
        has_conflicts: !conflicts.is_empty(),
        message: conflict_message(&conflicts, &worker_names),
        conflicts,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CrewAvailabilityRequest {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub exclude_job_id: Option<Uuid>,
}

async fn crew_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CrewAvailabilityRequest>,
) -> Result<Json<CrewAvailability>, AppError> {
    let window = TimeWindow::new(payload.start, payload.end)?;
    let availability = state
        .availability
        .check_crew(id, &window, payload.exclude_job_id)
        .await?;

    Ok(Json(availability))
}
