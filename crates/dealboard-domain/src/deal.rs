use chrono::{DateTime, Utc};
use dealboard_core::{BoardError, BoardItem, BoardResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type DealId = Uuid;

/// Outcome recorded when a deal is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseStatus {
    Won,
    Lost { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub title: String,
    /// Name of the pipeline stage this deal sits in.
    pub stage: String,
    pub position: i32,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub health_score: u8,
    #[serde(default)]
    pub expected_close_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actual_close_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lost_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deal {
    pub fn new(title: String, stage: String, value: f64, position: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            stage,
            position,
            value,
            health_score: 0,
            expected_close_date: None,
            actual_close_date: None,
            lost_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn move_to(&mut self, stage: String, position: i32) {
        self.stage = stage;
        self.position = position;
        self.updated_at = Utc::now();
    }

    /// Record the outcome of the deal. A deal closes once, and a lost deal
    /// needs a non-blank reason.
    pub fn close(&mut self, status: CloseStatus, now: DateTime<Utc>) -> BoardResult<()> {
        if self.is_closed() {
            return Err(BoardError::Validation(format!(
                "deal '{}' is already closed",
                self.title
            )));
        }
        let lost_reason = match status {
            CloseStatus::Won => None,
            CloseStatus::Lost { reason } => {
                let reason = reason.trim();
                if reason.is_empty() {
                    return Err(BoardError::Validation(
                        "a lost deal needs a reason".to_string(),
                    ));
                }
                Some(reason.to_string())
            }
        };
        self.actual_close_date = Some(now);
        self.lost_reason = lost_reason;
        self.updated_at = now;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.actual_close_date.is_some() || self.lost_reason.is_some()
    }

    pub fn is_won(&self) -> bool {
        self.actual_close_date.is_some() && self.lost_reason.is_none()
    }

    pub fn is_lost(&self) -> bool {
        self.lost_reason.is_some()
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.expected_close_date.is_some_and(|date| date < now)
    }
}

impl BoardItem for Deal {
    type Id = DealId;
    type Bucket = String;

    fn id(&self) -> &DealId {
        &self.id
    }

    fn bucket(&self) -> &String {
        &self.stage
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn set_bucket(&mut self, bucket: String) {
        self.stage = bucket;
    }

    fn set_position(&mut self, position: i32) {
        self.position = position;
    }
}
