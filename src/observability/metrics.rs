use prometheus::{
    Encoder, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub scoring_requests_total: IntCounterVec,
    pub scoring_latency_seconds: HistogramVec,
    pub proposal_decisions_total: IntCounterVec,
    pub pending_proposals: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let scoring_requests_total = IntCounterVec::new(
            Opts::new("scoring_requests_total", "Alternatives requests by outcome"),
            &["outcome"],
        )
        .expect("valid scoring_requests_total metric");

        let scoring_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "scoring_latency_seconds",
                "Latency of alternatives computation in seconds",
            ),
            &["outcome"],
        )
        .expect("valid scoring_latency_seconds metric");

        let proposal_decisions_total = IntCounterVec::new(
            Opts::new(
                "proposal_decisions_total",
                "Proposal approve/reject attempts by decision and outcome",
            ),
            &["decision", "outcome"],
        )
        .expect("valid proposal_decisions_total metric");

        let pending_proposals = IntGauge::new(
            "pending_proposals",
            "Proposals submitted and awaiting review",
        )
        .expect("valid pending_proposals metric");

        registry
            .register(Box::new(scoring_requests_total.clone()))
            .expect("register scoring_requests_total");
        registry
            .register(Box::new(scoring_latency_seconds.clone()))
            .expect("register scoring_latency_seconds");
        registry
            .register(Box::new(proposal_decisions_total.clone()))
            .expect("register proposal_decisions_total");
        registry
            .register(Box::new(pending_proposals.clone()))
            .expect("register pending_proposals");

        Self {
            registry,
            scoring_requests_total,
            scoring_latency_seconds,
            proposal_decisions_total,
            pending_proposals,
        }
    }

    pub fn observe_scoring(&self, outcome: &str, elapsed_secs: f64) {
        self.scoring_latency_seconds
            .with_label_values(&[outcome])
            .observe(elapsed_secs);
        self.scoring_requests_total
            .with_label_values(&[outcome])
            .inc();
    }

    pub fn record_decision(&self, decision: &str, outcome: &str) {
        self.proposal_decisions_total
            .with_label_values(&[decision, outcome])
            .inc();
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
