pub mod board;
pub mod bucket;
pub mod deal;
pub mod position;
pub mod reconcile;
pub mod session;
pub mod stage;
pub mod summary;
pub mod task;
pub mod workspace;

pub use board::Board;
pub use bucket::BucketSet;
pub use deal::{CloseStatus, Deal, DealId};
pub use position::PositionPolicy;
pub use reconcile::{Move, PositionUpdate, Reconciler};
pub use session::{BoardMode, BoardSession, DragDrop, DropTarget, PendingMove};
pub use stage::{PipelineStage, StageId};
pub use summary::{HealthBand, PipelineSummary, StageSummary};
pub use task::{Task, TaskId, TaskPriority, TaskReference, TaskStatus};
pub use workspace::Workspace;
