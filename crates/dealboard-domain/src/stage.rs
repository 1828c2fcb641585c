use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type StageId = Uuid;

/// A pipeline column. Deals refer to their stage by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStage {
    pub id: StageId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    pub order: i32,
    #[serde(default)]
    pub stage_probability: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PipelineStage {
    pub fn new(name: String, order: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description: None,
            color: None,
            order,
            stage_probability: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update_order(&mut self, order: i32) {
        self.order = order;
        self.updated_at = Utc::now();
    }
}
