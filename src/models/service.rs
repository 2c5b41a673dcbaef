use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Relative importance of each scoring dimension. Only the ratios matter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ServiceWeights {
    pub sla: f64,
    pub route: f64,
    pub continuity: f64,
    pub balance: f64,
}

impl Default for ServiceWeights {
    fn default() -> Self {
        Self {
            sla: 0.35,
            route: 0.30,
            continuity: 0.20,
            balance: 0.15,
        }
    }
}

impl ServiceWeights {
    /// Scales the weights to sum to 1. Negative or non-finite entries count
    /// as 0; an all-zero vector falls back to equal weights.
    pub fn normalized(&self) -> ServiceWeights {
        let clean = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
        let (sla, route, continuity, balance) = (
            clean(self.sla),
            clean(self.route),
            clean(self.continuity),
            clean(self.balance),
        );
        let total = sla + route + continuity + balance;

        if total <= 0.0 {
            return ServiceWeights {
                sla: 0.25,
                route: 0.25,
                continuity: 0.25,
                balance: 0.25,
            };
        }

        ServiceWeights {
            sla: sla / total,
            route: route / total,
            continuity: continuity / total,
            balance: balance / total,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceTypeConfig {
    pub provider_id: Uuid,
    pub service_type: String,
    #[serde(default)]
    pub weights: ServiceWeights,
    /// A worker needs at least one of these. Empty means no skill filter.
    #[serde(default)]
    pub required_skill_ids: Vec<Uuid>,
}

impl ServiceTypeConfig {
    pub fn fallback(provider_id: Uuid, service_type: &str) -> Self {
        Self {
            provider_id,
            service_type: service_type.to_string(),
            weights: ServiceWeights::default(),
            required_skill_ids: Vec::new(),
        }
    }
}
