use dealboard_core::{BoardError, BoardResult};
use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use crate::{PipelineStage, TaskStatus};

/// Ordered, duplicate-free list of every column a board knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSet<B> {
    buckets: Vec<B>,
}

impl<B: Clone + Eq + Hash + Display> BucketSet<B> {
    pub fn new(buckets: Vec<B>) -> BoardResult<Self> {
        let mut seen = HashSet::with_capacity(buckets.len());
        for bucket in &buckets {
            if !seen.insert(bucket) {
                return Err(BoardError::Validation(format!(
                    "bucket '{}' listed more than once",
                    bucket
                )));
            }
        }
        Ok(Self { buckets })
    }

    pub fn contains(&self, bucket: &B) -> bool {
        self.buckets.contains(bucket)
    }

    pub fn index_of(&self, bucket: &B) -> Option<usize> {
        self.buckets.iter().position(|b| b == bucket)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, B> {
        self.buckets.iter()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl BucketSet<TaskStatus> {
    pub fn task_statuses() -> Self {
        Self {
            buckets: TaskStatus::ALL.to_vec(),
        }
    }
}

impl BucketSet<String> {
    /// Stage names ordered by each stage's `order`. Stages sharing an order
    /// keep the order they were given in.
    pub fn from_stages(stages: &[PipelineStage]) -> BoardResult<Self> {
        let mut sorted: Vec<&PipelineStage> = stages.iter().collect();
        sorted.sort_by_key(|stage| stage.order);
        Self::new(sorted.into_iter().map(|stage| stage.name.clone()).collect())
    }
}

impl<'a, B> IntoIterator for &'a BucketSet<B> {
    type Item = &'a B;
    type IntoIter = std::slice::Iter<'a, B>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_statuses_in_column_order() {
        let set = BucketSet::task_statuses();
        let names: Vec<_> = set.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["backlog", "todo", "in-progress", "done"]);
    }

    #[test]
    fn test_from_stages_sorts_by_order() {
        let stages = vec![
            PipelineStage::new("Won".to_string(), 3),
            PipelineStage::new("Lead".to_string(), 1),
            PipelineStage::new("Proposal".to_string(), 2),
        ];
        let set = BucketSet::from_stages(&stages).unwrap();
        let names: Vec<_> = set.iter().cloned().collect();
        assert_eq!(names, vec!["Lead", "Proposal", "Won"]);
        assert_eq!(set.index_of(&"Won".to_string()), Some(2));
    }

    #[test]
    fn test_duplicate_buckets_rejected() {
        let err = BucketSet::new(vec!["a".to_string(), "a".to_string()]).unwrap_err();
        assert!(matches!(err, BoardError::Validation(_)));
    }
}
