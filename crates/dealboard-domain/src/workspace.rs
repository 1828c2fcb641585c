use chrono::{DateTime, Utc};
use dealboard_core::{BoardError, BoardItem, BoardResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    Board, BucketSet, CloseStatus, Deal, DealId, PipelineStage, PositionPolicy, PositionUpdate, Task, TaskId,
    TaskStatus,
};

/// Everything a board file holds: the source-of-truth lists boards are
/// rebuilt from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub deals: Vec<Deal>,
    #[serde(default)]
    pub stages: Vec<PipelineStage>,
}

impl Workspace {
    pub fn task_board(&self) -> BoardResult<Board<Task>> {
        Board::build(BucketSet::task_statuses(), self.tasks.iter().cloned())
    }

    pub fn deal_board(&self) -> BoardResult<Board<Deal>> {
        Board::build(
            BucketSet::from_stages(&self.stages)?,
            self.deals.iter().cloned(),
        )
    }

    /// Append a task at the end of its column.
    pub fn add_task(
        &mut self,
        title: String,
        status: TaskStatus,
        policy: &PositionPolicy,
    ) -> &Task {
        let position = policy.append_position(
            self.tasks
                .iter()
                .filter(|t| t.status == status)
                .map(|t| t.position),
        );
        self.tasks.push(Task::new(title, status, position));
        &self.tasks[self.tasks.len() - 1]
    }

    /// Append a deal at the end of its stage. The stage must exist.
    pub fn add_deal(
        &mut self,
        title: String,
        stage: String,
        value: f64,
        policy: &PositionPolicy,
    ) -> BoardResult<&Deal> {
        if !self.stages.iter().any(|s| s.name == stage) {
            return Err(BoardError::UnknownBucket(stage));
        }
        let position = policy.append_position(
            self.deals
                .iter()
                .filter(|d| d.stage == stage)
                .map(|d| d.position),
        );
        self.deals.push(Deal::new(title, stage, value, position));
        Ok(&self.deals[self.deals.len() - 1])
    }

    pub fn add_stage(&mut self, name: String, order: i32) -> BoardResult<&PipelineStage> {
        if self.stages.iter().any(|s| s.name == name) {
            return Err(BoardError::Validation(format!(
                "stage '{}' already exists",
                name
            )));
        }
        self.stages.push(PipelineStage::new(name, order));
        Ok(&self.stages[self.stages.len() - 1])
    }

    /// Move a stage to a new column order. Deals keep their stage name, so
    /// only the deal board's column order changes.
    pub fn reorder_stage(&mut self, name: &str, order: i32) -> BoardResult<&PipelineStage> {
        let stage = self
            .stages
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| BoardError::NotFound(format!("stage '{}'", name)))?;
        stage.update_order(order);
        Ok(&*stage)
    }

    /// Mark a deal won or lost. Its stage and position stay as they are.
    pub fn close_deal(
        &mut self,
        id: DealId,
        status: CloseStatus,
        now: DateTime<Utc>,
    ) -> BoardResult<&Deal> {
        let deal = self
            .deals
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| BoardError::NotFound(format!("deal {}", id)))?;
        deal.close(status, now)?;
        Ok(&*deal)
    }

    /// Upsert task positions by id. Either every update applies or none do.
    pub fn apply_task_updates(
        &mut self,
        updates: &[PositionUpdate<TaskId, TaskStatus>],
    ) -> BoardResult<usize> {
        apply_updates(&mut self.tasks, updates, |task, update| {
            task.move_to(update.bucket, update.position)
        })
    }

    /// Upsert deal positions by id. Every named stage must exist.
    pub fn apply_deal_updates(
        &mut self,
        updates: &[PositionUpdate<DealId, String>],
    ) -> BoardResult<usize> {
        if let Some(update) = updates
            .iter()
            .find(|u| !self.stages.iter().any(|s| s.name == u.bucket))
        {
            return Err(BoardError::UnknownBucket(update.bucket.clone()));
        }
        apply_updates(&mut self.deals, updates, |deal, update| {
            deal.move_to(update.bucket.clone(), update.position)
        })
    }
}

fn apply_updates<C: BoardItem>(
    records: &mut [C],
    updates: &[PositionUpdate<C::Id, C::Bucket>],
    mut apply: impl FnMut(&mut C, &PositionUpdate<C::Id, C::Bucket>),
) -> BoardResult<usize> {
    let index: HashMap<C::Id, usize> = records
        .iter()
        .enumerate()
        .map(|(i, record)| (record.id().clone(), i))
        .collect();

    let mut targets = Vec::with_capacity(updates.len());
    for update in updates {
        let i = index
            .get(&update.id)
            .copied()
            .ok_or_else(|| BoardError::NotFound(format!("card {}", update.id)))?;
        targets.push(i);
    }

    for (i, update) in targets.into_iter().zip(updates) {
        apply(&mut records[i], update);
    }
    tracing::debug!(count = updates.len(), "Applied position updates");
    Ok(updates.len())
}
