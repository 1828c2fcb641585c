//! One board as owned by a single view.
//!
//! A session applies drops optimistically and hands back the updates to
//! persist, tagged with a generation. The caller reports each generation back
//! with [`BoardSession::confirm`] or [`BoardSession::revert`]; a revert rolls
//! the board back to just before the failed batch and discards every later
//! batch, since those were computed from the state that never got stored.

use dealboard_core::{BoardItem, BoardResult, LogEntry, Loggable};
use std::collections::VecDeque;

use crate::{Board, Move, PositionUpdate, Reconciler};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardMode {
    #[default]
    Editable,
    ReadOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTarget<B> {
    pub bucket: B,
    pub index: usize,
}

/// The end of a drag gesture. `destination` is `None` when the card was
/// released outside every column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragDrop<B> {
    pub source_bucket: B,
    pub source_index: usize,
    pub destination: Option<DropTarget<B>>,
}

impl<B: PartialEq> DragDrop<B> {
    pub fn to(source_bucket: B, source_index: usize, bucket: B, index: usize) -> Self {
        Self {
            source_bucket,
            source_index,
            destination: Some(DropTarget { bucket, index }),
        }
    }

    pub fn cancelled(source_bucket: B, source_index: usize) -> Self {
        Self {
            source_bucket,
            source_index,
            destination: None,
        }
    }

    pub fn into_move(self) -> Option<Move<B>> {
        let target = self.destination?;
        Some(Move::new(
            self.source_bucket,
            self.source_index,
            target.bucket,
            target.index,
        ))
    }
}

/// Updates produced by one drop, waiting to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove<Id, B> {
    pub generation: u64,
    pub updates: Vec<PositionUpdate<Id, B>>,
}

pub struct BoardSession<C: BoardItem> {
    board: Board<C>,
    confirmed: Board<C>,
    pending: VecDeque<(u64, Board<C>)>,
    next_generation: u64,
    mode: BoardMode,
    reconciler: Reconciler,
    logs: Vec<LogEntry>,
}

impl<C: BoardItem> BoardSession<C> {
    pub fn new(board: Board<C>, reconciler: Reconciler, mode: BoardMode) -> Self {
        Self {
            confirmed: board.clone(),
            board,
            pending: VecDeque::new(),
            next_generation: 1,
            mode,
            reconciler,
            logs: Vec::new(),
        }
    }

    pub fn read_only(board: Board<C>) -> Self {
        Self::new(board, Reconciler::default(), BoardMode::ReadOnly)
    }

    pub fn board(&self) -> &Board<C> {
        &self.board
    }

    pub fn mode(&self) -> BoardMode {
        self.mode
    }

    pub fn is_read_only(&self) -> bool {
        self.mode == BoardMode::ReadOnly
    }

    pub fn pending_generations(&self) -> Vec<u64> {
        self.pending.iter().map(|(generation, _)| *generation).collect()
    }

    /// Apply a drop. Returns `None` when nothing changed: read-only board,
    /// drop outside any column, or a drop that no longer matches the board.
    pub fn handle_drop(
        &mut self,
        drop: DragDrop<C::Bucket>,
    ) -> Option<PendingMove<C::Id, C::Bucket>> {
        if self.is_read_only() {
            tracing::debug!("Ignoring drop on read-only board");
            return None;
        }
        let mv = drop.into_move()?;

        match self.reconciler.apply_move_in_place(&mut self.board, &mv) {
            Ok(updates) => {
                let generation = self.next_generation;
                self.next_generation += 1;
                self.pending.push_back((generation, self.board.clone()));
                self.add_log(format!(
                    "Moved {}[{}] to {}[{}] ({} updates)",
                    mv.source_bucket,
                    mv.source_index,
                    mv.dest_bucket,
                    mv.dest_index,
                    updates.len()
                ));
                Some(PendingMove {
                    generation,
                    updates,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring drop that does not match the board");
                None
            }
        }
    }

    /// Mark `generation` as stored. Earlier generations are implied stored
    /// too. Returns false if the generation is not pending.
    pub fn confirm(&mut self, generation: u64) -> bool {
        let Some(index) = self.pending_index(generation) else {
            return false;
        };
        for (_, board) in self.pending.drain(..=index) {
            self.confirmed = board;
        }
        true
    }

    /// Roll back a batch that failed to store. Returns how many pending
    /// batches were discarded; 0 if the generation is not pending.
    pub fn revert(&mut self, generation: u64) -> usize {
        let Some(index) = self.pending_index(generation) else {
            return 0;
        };
        let discarded = self.pending.len() - index;
        self.pending.truncate(index);
        self.board = match self.pending.back() {
            Some((_, board)) => board.clone(),
            None => self.confirmed.clone(),
        };
        tracing::warn!(generation, discarded, "Reverted unsaved board moves");
        self.add_log(format!(
            "Reverted {} unsaved move(s) from generation {}",
            discarded, generation
        ));
        discarded
    }

    /// Rebuild from a refetched card list. Anything still pending is
    /// superseded by the fresh data.
    pub fn refresh(&mut self, items: impl IntoIterator<Item = C>) -> BoardResult<()> {
        self.board.rebuild(items)?;
        self.confirmed = self.board.clone();
        self.pending.clear();
        Ok(())
    }

    fn pending_index(&self, generation: u64) -> Option<usize> {
        self.pending.iter().position(|(g, _)| *g == generation)
    }
}

impl<C: BoardItem> Loggable for BoardSession<C> {
    fn add_log(&mut self, message: String) {
        self.logs.push(LogEntry::new(message));
    }

    fn get_logs(&self) -> &[LogEntry] {
        &self.logs
    }
}
