use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crew {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub name: String,
    pub member_ids: Vec<Uuid>,
}
