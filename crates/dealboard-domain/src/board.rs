use dealboard_core::{BoardError, BoardItem, BoardResult};
use std::collections::{HashMap, HashSet};

use crate::BucketSet;

/// Cards grouped into buckets, each bucket ordered by ascending position.
///
/// A board is a derived view over some source-of-truth list of cards. It is
/// rebuilt whenever that list changes and mutated locally by the reconciler
/// in between.
#[derive(Debug, Clone)]
pub struct Board<C: BoardItem> {
    buckets: BucketSet<C::Bucket>,
    columns: HashMap<C::Bucket, Vec<C>>,
}

impl<C: BoardItem> Board<C> {
    pub fn empty(buckets: BucketSet<C::Bucket>) -> Self {
        let columns = buckets
            .iter()
            .map(|bucket| (bucket.clone(), Vec::new()))
            .collect();
        Self { buckets, columns }
    }

    /// Group `items` by bucket and sort each bucket by position.
    ///
    /// Ties keep the order the items came in.
    pub fn build(
        buckets: BucketSet<C::Bucket>,
        items: impl IntoIterator<Item = C>,
    ) -> BoardResult<Self> {
        let mut board = Self::empty(buckets);
        let mut seen = HashSet::new();

        for item in items {
            if !seen.insert(item.id().clone()) {
                return Err(BoardError::DuplicateCard(item.id().to_string()));
            }
            let column = board
                .columns
                .get_mut(item.bucket())
                .ok_or_else(|| BoardError::UnknownBucket(item.bucket().to_string()))?;
            column.push(item);
        }

        for column in board.columns.values_mut() {
            column.sort_by_key(|card| card.position());
        }

        Ok(board)
    }

    /// Replace the contents from a refetched card list. On error the board
    /// keeps its previous contents.
    pub fn rebuild(&mut self, items: impl IntoIterator<Item = C>) -> BoardResult<()> {
        *self = Self::build(self.buckets.clone(), items)?;
        Ok(())
    }

    pub fn buckets(&self) -> &BucketSet<C::Bucket> {
        &self.buckets
    }

    pub fn contains_bucket(&self, bucket: &C::Bucket) -> bool {
        self.columns.contains_key(bucket)
    }

    /// Cards in `bucket`, in order. Unknown buckets read as empty.
    pub fn cards(&self, bucket: &C::Bucket) -> &[C] {
        self.columns.get(bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn column_mut(&mut self, bucket: &C::Bucket) -> BoardResult<&mut Vec<C>> {
        self.columns
            .get_mut(bucket)
            .ok_or_else(|| BoardError::UnknownBucket(bucket.to_string()))
    }

    pub fn len(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.values().all(Vec::is_empty)
    }

    /// Bucket and index of the card with `id`.
    pub fn find(&self, id: &C::Id) -> Option<(&C::Bucket, usize)> {
        self.buckets.iter().find_map(|bucket| {
            self.cards(bucket)
                .iter()
                .position(|card| card.id() == id)
                .map(|index| (bucket, index))
        })
    }

    /// Buckets in display order with their cards.
    pub fn iter(&self) -> impl Iterator<Item = (&C::Bucket, &[C])> {
        self.buckets
            .iter()
            .map(move |bucket| (bucket, self.cards(bucket)))
    }

    /// All cards, bucket by bucket in display order.
    pub fn into_items(mut self) -> Vec<C> {
        let mut items = Vec::with_capacity(self.len());
        for bucket in self.buckets.iter() {
            if let Some(column) = self.columns.remove(bucket) {
                items.extend(column);
            }
        }
        items
    }

    /// Every card appears once and sits under the bucket it names.
    pub fn check_invariants(&self) -> BoardResult<()> {
        let mut seen = HashSet::new();
        for (bucket, cards) in self.iter() {
            for card in cards {
                if card.bucket() != bucket {
                    return Err(BoardError::Validation(format!(
                        "card {} is filed under '{}' but names bucket '{}'",
                        card.id(),
                        bucket,
                        card.bucket()
                    )));
                }
                if !seen.insert(card.id().clone()) {
                    return Err(BoardError::DuplicateCard(card.id().to_string()));
                }
            }
        }
        Ok(())
    }
}
