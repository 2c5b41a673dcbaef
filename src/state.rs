use std::sync::Arc;

use tokio::sync::broadcast;

use crate::engine::availability::AvailabilityChecker;
use crate::engine::proposal::ProposalWorkflow;
use crate::engine::scoring::{ScoringEngine, ScoringSettings};
use crate::geo::Geocoder;
use crate::models::proposal::ProposalEvent;
use crate::observability::metrics::Metrics;
use crate::store::{Clock, Repository};

pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub availability: AvailabilityChecker,
    pub scoring: ScoringEngine,
    pub proposals: ProposalWorkflow,
    pub proposal_events_tx: broadcast::Sender<ProposalEvent>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn Repository>,
        geocoder: Arc<dyn Geocoder>,
        clock: Arc<dyn Clock>,
        settings: ScoringSettings,
        event_buffer_size: usize,
    ) -> Self {
        let (proposal_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            availability: AvailabilityChecker::new(repo.clone()),
            scoring: ScoringEngine::new(repo.clone(), geocoder, settings),
            proposals: ProposalWorkflow::new(repo.clone(), clock, proposal_events_tx.clone()),
            repo,
            proposal_events_tx,
            metrics: Metrics::new(),
        }
    }
}
