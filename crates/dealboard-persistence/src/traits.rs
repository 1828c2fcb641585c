use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dealboard_core::{BoardItem, BoardResult};
use dealboard_domain::PositionUpdate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const FORMAT_VERSION: u32 = 1;

/// Metadata for persistence operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceMetadata {
    /// Version of the persistence format
    pub format_version: u32,
    /// ID of the instance that performed the save
    pub instance_id: Uuid,
    /// When this data was saved
    pub saved_at: DateTime<Utc>,
}

impl PersistenceMetadata {
    pub fn new(instance_id: Uuid) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            instance_id,
            saved_at: Utc::now(),
        }
    }
}

/// Durable side of a board: accepts the bulk `{id, bucket, position}` rows a
/// reconciled move produced and upserts them by id.
#[async_trait]
pub trait PositionSink<C>: Send + Sync
where
    C: BoardItem,
    C::Id: Send + Sync,
    C::Bucket: Send + Sync,
{
    /// Returns how many rows were written.
    async fn apply_updates(&self, updates: &[PositionUpdate<C::Id, C::Bucket>])
        -> BoardResult<usize>;
}
