use dealboard_core::{BoardItem, BoardResult};
use dealboard_domain::{BoardSession, PendingMove};

use crate::traits::PositionSink;

/// Write one pending batch through `sink` and report the outcome back to the
/// session: confirmed on success, reverted on failure. The sink error is
/// returned after the board has been rolled back.
pub async fn persist_pending<C, S>(
    session: &mut BoardSession<C>,
    sink: &S,
    pending: &PendingMove<C::Id, C::Bucket>,
) -> BoardResult<usize>
where
    C: BoardItem,
    C::Id: Send + Sync,
    C::Bucket: Send + Sync,
    S: PositionSink<C> + ?Sized,
{
    match sink.apply_updates(&pending.updates).await {
        Ok(written) => {
            session.confirm(pending.generation);
            tracing::debug!(generation = pending.generation, written, "Persisted move");
            Ok(written)
        }
        Err(e) => {
            tracing::warn!(
                generation = pending.generation,
                error = %e,
                "Failed to persist move, reverting"
            );
            session.revert(pending.generation);
            Err(e)
        }
    }
}
