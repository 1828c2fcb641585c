//! Drag-and-drop reconciliation.
//!
//! [`Reconciler::apply_move`] moves one card on a [`Board`], renumbers the
//! buckets it touched and reports only the `{id, bucket, position}` triples
//! that a persistence layer has to write. The moved card is always reported,
//! first, since its bucket may have changed even when its number did not.

use dealboard_core::{AppConfig, BoardError, BoardItem, BoardResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Board, PositionPolicy};

/// Take the card at `source_index` of `source_bucket` and drop it at
/// `dest_index` of `dest_bucket`. Both buckets may be the same.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move<B> {
    pub source_bucket: B,
    pub source_index: usize,
    pub dest_bucket: B,
    pub dest_index: usize,
}

impl<B: PartialEq> Move<B> {
    pub fn new(source_bucket: B, source_index: usize, dest_bucket: B, dest_index: usize) -> Self {
        Self {
            source_bucket,
            source_index,
            dest_bucket,
            dest_index,
        }
    }

    pub fn is_cross_bucket(&self) -> bool {
        self.source_bucket != self.dest_bucket
    }
}

/// One row of the bulk update sent to persistence, upserted by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate<Id, B> {
    pub id: Id,
    pub bucket: B,
    pub position: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciler {
    policy: PositionPolicy,
    clamp_destination: bool,
    auto_compact: bool,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self {
            policy: PositionPolicy::default(),
            clamp_destination: true,
            auto_compact: false,
        }
    }
}

type Updates<C> = Vec<PositionUpdate<<C as BoardItem>::Id, <C as BoardItem>::Bucket>>;

impl Reconciler {
    pub fn new(policy: PositionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn from_config(config: &AppConfig) -> BoardResult<Self> {
        Ok(Self {
            policy: PositionPolicy::from_config(config)?,
            clamp_destination: config.clamp_destination,
            auto_compact: config.auto_compact,
        })
    }

    pub fn with_clamp_destination(mut self, clamp: bool) -> Self {
        self.clamp_destination = clamp;
        self
    }

    pub fn with_auto_compact(mut self, auto_compact: bool) -> Self {
        self.auto_compact = auto_compact;
        self
    }

    pub fn policy(&self) -> &PositionPolicy {
        &self.policy
    }

    /// Apply `mv` to a copy of `board`, returning the new board and the
    /// updates to persist. `board` itself is never modified.
    pub fn apply_move<C: BoardItem>(
        &self,
        board: &Board<C>,
        mv: &Move<C::Bucket>,
    ) -> BoardResult<(Board<C>, Updates<C>)> {
        let mut next = board.clone();
        let updates = self.apply_move_in_place(&mut next, mv)?;
        Ok((next, updates))
    }

    /// Apply `mv` to `board` directly. All checks run before the first
    /// mutation, so on error the board is exactly as it was.
    pub fn apply_move_in_place<C: BoardItem>(
        &self,
        board: &mut Board<C>,
        mv: &Move<C::Bucket>,
    ) -> BoardResult<Updates<C>> {
        if !board.contains_bucket(&mv.source_bucket)
            || mv.source_index >= board.cards(&mv.source_bucket).len()
        {
            return Err(BoardError::invalid_move(&mv.source_bucket, mv.source_index));
        }
        if !board.contains_bucket(&mv.dest_bucket) {
            return Err(BoardError::UnknownBucket(mv.dest_bucket.to_string()));
        }

        let cross_bucket = mv.is_cross_bucket();
        let dest_len = board.cards(&mv.dest_bucket).len() - usize::from(!cross_bucket);
        let dest_index = if mv.dest_index <= dest_len {
            mv.dest_index
        } else if self.clamp_destination {
            dest_len
        } else {
            return Err(BoardError::invalid_move(&mv.dest_bucket, mv.dest_index));
        };

        let previous = previous_positions(board, mv);

        let mut card = board
            .column_mut(&mv.source_bucket)?
            .remove(mv.source_index);
        if cross_bucket {
            card.set_bucket(mv.dest_bucket.clone());
        }
        let moved_id = card.id().clone();
        board.column_mut(&mv.dest_bucket)?.insert(dest_index, card);

        self.renumber(board, &mv.dest_bucket)?;
        if cross_bucket {
            self.renumber(board, &mv.source_bucket)?;
        }

        let mut updates = Vec::new();
        let moved = &board.cards(&mv.dest_bucket)[dest_index];
        updates.push(PositionUpdate {
            id: moved_id.clone(),
            bucket: mv.dest_bucket.clone(),
            position: moved.position(),
        });
        collect_changes(board, &mv.dest_bucket, &previous, Some(&moved_id), &mut updates);
        if cross_bucket {
            collect_changes(board, &mv.source_bucket, &previous, None, &mut updates);
        }

        tracing::debug!(
            from = %mv.source_bucket,
            from_index = mv.source_index,
            to = %mv.dest_bucket,
            to_index = dest_index,
            card = %moved_id,
            updates = updates.len(),
            "Reconciled board move"
        );

        Ok(updates)
    }

    /// Renumber every card in `bucket` so positions are strictly increasing
    /// again, returning the cards whose position changed. A bucket with more
    /// cards than the ceiling cannot be strictly ordered and is rejected
    /// untouched.
    pub fn compact<C: BoardItem>(
        &self,
        board: &mut Board<C>,
        bucket: &C::Bucket,
    ) -> BoardResult<Updates<C>> {
        let column = board.column_mut(bucket)?;
        let len = column.len();
        if !self.policy.can_compact(len) {
            return Err(BoardError::Validation(format!(
                "bucket '{}' holds {} cards, more than the position ceiling {}",
                bucket,
                len,
                self.policy.ceiling()
            )));
        }
        let mut updates = Vec::new();
        for (index, card) in column.iter_mut().enumerate() {
            let position = self.policy.compacted_position(index, len);
            if card.position() != position {
                card.set_position(position);
                updates.push(PositionUpdate {
                    id: card.id().clone(),
                    bucket: bucket.clone(),
                    position,
                });
            }
        }
        if !updates.is_empty() {
            tracing::info!(
                bucket = %bucket,
                cards = len,
                changed = updates.len(),
                "Compacted bucket"
            );
        }
        Ok(updates)
    }

    fn renumber<C: BoardItem>(
        &self,
        board: &mut Board<C>,
        bucket: &C::Bucket,
    ) -> BoardResult<()> {
        for (index, card) in board.column_mut(bucket)?.iter_mut().enumerate() {
            card.set_position(self.policy.position_for(index));
        }
        let cards = board.cards(bucket);
        if self.auto_compact
            && self.policy.is_exhausted(cards)
            && self.policy.can_compact(cards.len())
        {
            self.compact(board, bucket)?;
        }
        Ok(())
    }
}

fn previous_positions<C: BoardItem>(
    board: &Board<C>,
    mv: &Move<C::Bucket>,
) -> HashMap<C::Id, i32> {
    let mut previous = HashMap::new();
    for bucket in [&mv.source_bucket, &mv.dest_bucket] {
        for card in board.cards(bucket) {
            previous.insert(card.id().clone(), card.position());
        }
    }
    previous
}

fn collect_changes<C: BoardItem>(
    board: &Board<C>,
    bucket: &C::Bucket,
    previous: &HashMap<C::Id, i32>,
    skip: Option<&C::Id>,
    updates: &mut Updates<C>,
) {
    for card in board.cards(bucket) {
        if skip == Some(card.id()) {
            continue;
        }
        if previous.get(card.id()) != Some(&card.position()) {
            updates.push(PositionUpdate {
                id: card.id().clone(),
                bucket: bucket.clone(),
                position: card.position(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BucketSet;
    use std::collections::HashSet;

    #[derive(Debug, Clone, PartialEq)]
    struct Card {
        id: &'static str,
        bucket: &'static str,
        position: i32,
    }

    impl BoardItem for Card {
        type Id = &'static str;
        type Bucket = &'static str;

        fn id(&self) -> &Self::Id {
            &self.id
        }

        fn bucket(&self) -> &Self::Bucket {
            &self.bucket
        }

        fn position(&self) -> i32 {
            self.position
        }

        fn set_bucket(&mut self, bucket: Self::Bucket) {
            self.bucket = bucket;
        }

        fn set_position(&mut self, position: i32) {
            self.position = position;
        }
    }

    fn card(id: &'static str, bucket: &'static str, position: i32) -> Card {
        Card {
            id,
            bucket,
            position,
        }
    }

    fn board(buckets: &[&'static str], cards: Vec<Card>) -> Board<Card> {
        Board::build(BucketSet::new(buckets.to_vec()).unwrap(), cards).unwrap()
    }

    fn update(
        id: &'static str,
        bucket: &'static str,
        position: i32,
    ) -> PositionUpdate<&'static str, &'static str> {
        PositionUpdate {
            id,
            bucket,
            position,
        }
    }

    fn ids(board: &Board<Card>, bucket: &'static str) -> Vec<&'static str> {
        board.cards(&bucket).iter().map(|c| c.id).collect()
    }

    fn positions(board: &Board<Card>, bucket: &'static str) -> Vec<i32> {
        board.cards(&bucket).iter().map(|c| c.position).collect()
    }

    #[test]
    fn test_move_across_buckets_renumbers_both() {
        let before = board(
            &["todo", "done"],
            vec![card("a", "todo", 1000), card("b", "todo", 2000)],
        );

        let (after, updates) = Reconciler::default()
            .apply_move(&before, &Move::new("todo", 0, "done", 0))
            .unwrap();

        assert_eq!(ids(&after, "todo"), vec!["b"]);
        assert_eq!(ids(&after, "done"), vec!["a"]);
        assert_eq!(after.cards(&"done")[0].bucket, "done");
        assert_eq!(
            updates,
            vec![update("a", "done", 1000), update("b", "todo", 1000)]
        );
        // the input board is untouched
        assert_eq!(ids(&before, "todo"), vec!["a", "b"]);
    }

    #[test]
    fn test_drop_in_place_reports_only_moved_card() {
        let before = board(&["todo"], vec![card("a", "todo", 1000)]);

        let (after, updates) = Reconciler::default()
            .apply_move(&before, &Move::new("todo", 0, "todo", 0))
            .unwrap();

        assert_eq!(ids(&after, "todo"), vec!["a"]);
        assert_eq!(updates, vec![update("a", "todo", 1000)]);
    }

    #[test]
    fn test_source_index_out_of_range_is_invalid_move() {
        let before = board(&["todo", "done"], vec![card("a", "todo", 1000)]);

        let err = Reconciler::default()
            .apply_move(&before, &Move::new("todo", 1, "done", 0))
            .unwrap_err();
        assert!(err.is_invalid_move());

        let mut in_place = before.clone();
        assert!(Reconciler::default()
            .apply_move_in_place(&mut in_place, &Move::new("todo", 5, "done", 0))
            .is_err());
        assert_eq!(ids(&in_place, "todo"), vec!["a"]);
        assert_eq!(positions(&in_place, "todo"), vec![1000]);
        assert!(in_place.cards(&"done").is_empty());
    }

    #[test]
    fn test_unknown_source_bucket_is_invalid_move() {
        let mut b = board(&["todo"], vec![card("a", "todo", 1000)]);
        let err = Reconciler::default()
            .apply_move_in_place(&mut b, &Move::new("archive", 0, "todo", 0))
            .unwrap_err();
        assert!(err.is_invalid_move());
    }

    #[test]
    fn test_unknown_destination_bucket_leaves_board() {
        let mut b = board(&["todo"], vec![card("a", "todo", 1000)]);
        let err = Reconciler::default()
            .apply_move_in_place(&mut b, &Move::new("todo", 0, "archive", 0))
            .unwrap_err();
        assert!(matches!(err, BoardError::UnknownBucket(_)));
        assert_eq!(ids(&b, "todo"), vec!["a"]);
    }

    #[test]
    fn test_reorder_within_bucket() {
        let before = board(
            &["todo"],
            vec![
                card("a", "todo", 1000),
                card("b", "todo", 2000),
                card("c", "todo", 3000),
            ],
        );

        let (after, updates) = Reconciler::default()
            .apply_move(&before, &Move::new("todo", 2, "todo", 0))
            .unwrap();

        assert_eq!(ids(&after, "todo"), vec!["c", "a", "b"]);
        assert_eq!(positions(&after, "todo"), vec![1000, 2000, 3000]);
        assert_eq!(
            updates,
            vec![
                update("c", "todo", 1000),
                update("a", "todo", 2000),
                update("b", "todo", 3000),
            ]
        );
    }

    #[test]
    fn test_unchanged_neighbours_are_not_reported() {
        let before = board(
            &["todo", "done"],
            vec![
                card("a", "todo", 1000),
                card("b", "todo", 2000),
                card("c", "todo", 3000),
                card("x", "done", 1000),
            ],
        );

        // c leaves the end of todo: a and b keep their numbers
        let (_, updates) = Reconciler::default()
            .apply_move(&before, &Move::new("todo", 2, "done", 1))
            .unwrap();

        assert_eq!(updates, vec![update("c", "done", 2000)]);
    }

    #[test]
    fn test_bucket_change_reported_even_when_position_is_equal() {
        let before = board(
            &["todo", "done"],
            vec![card("a", "todo", 1000), card("b", "done", 2000)],
        );

        let (after, updates) = Reconciler::default()
            .apply_move(&before, &Move::new("todo", 0, "done", 0))
            .unwrap();

        assert_eq!(updates[0], update("a", "done", 1000));
        assert_eq!(after.cards(&"done")[0].bucket, "done");
        // b slid to index 1 and already sat at 2000
        assert_eq!(updates.len(), 1);
    }

    #[test]
    fn test_non_contiguous_positions_are_normalised() {
        let before = board(
            &["todo", "done"],
            vec![
                card("a", "todo", 7),
                card("b", "todo", 9),
                card("x", "done", 50),
            ],
        );

        let (after, updates) = Reconciler::default()
            .apply_move(&before, &Move::new("done", 0, "todo", 1))
            .unwrap();

        assert_eq!(ids(&after, "todo"), vec!["a", "x", "b"]);
        assert_eq!(positions(&after, "todo"), vec![1000, 2000, 3000]);
        assert_eq!(
            updates,
            vec![
                update("x", "todo", 2000),
                update("a", "todo", 1000),
                update("b", "todo", 3000),
            ]
        );
    }

    #[test]
    fn test_destination_index_is_clamped() {
        let before = board(
            &["todo", "done"],
            vec![card("a", "todo", 1000), card("x", "done", 1000)],
        );

        let (after, updates) = Reconciler::default()
            .apply_move(&before, &Move::new("todo", 0, "done", 42))
            .unwrap();

        assert_eq!(ids(&after, "done"), vec!["x", "a"]);
        assert_eq!(updates, vec![update("a", "done", 2000)]);
    }

    #[test]
    fn test_destination_index_rejected_without_clamp() {
        let mut b = board(
            &["todo", "done"],
            vec![card("a", "todo", 1000), card("b", "todo", 2000)],
        );
        let reconciler = Reconciler::default().with_clamp_destination(false);

        // within the same bucket the length after removal is 1
        let err = reconciler
            .apply_move_in_place(&mut b, &Move::new("todo", 0, "todo", 2))
            .unwrap_err();
        assert!(err.is_invalid_move());
        assert_eq!(ids(&b, "todo"), vec!["a", "b"]);

        assert!(reconciler
            .apply_move_in_place(&mut b, &Move::new("todo", 0, "todo", 1))
            .is_ok());
        assert_eq!(ids(&b, "todo"), vec!["b", "a"]);
    }

    #[test]
    fn test_positions_clamp_at_ceiling() {
        let policy = PositionPolicy::new(10, 20).unwrap();
        let before = board(
            &["todo", "done"],
            vec![
                card("a", "todo", 10),
                card("b", "todo", 20),
                card("c", "done", 10),
            ],
        );

        let (after, _) = Reconciler::new(policy)
            .apply_move(&before, &Move::new("done", 0, "todo", 2))
            .unwrap();

        assert_eq!(positions(&after, "todo"), vec![10, 20, 20]);
    }

    #[test]
    fn test_auto_compact_spreads_exhausted_bucket() {
        let policy = PositionPolicy::new(10, 20).unwrap();
        let before = board(
            &["todo", "done"],
            vec![
                card("a", "todo", 10),
                card("b", "todo", 20),
                card("c", "done", 10),
            ],
        );

        let (after, updates) = Reconciler::new(policy)
            .with_auto_compact(true)
            .apply_move(&before, &Move::new("done", 0, "todo", 2))
            .unwrap();

        // 3 cards under a ceiling of 20: step 6
        assert_eq!(positions(&after, "todo"), vec![6, 12, 18]);
        let reported: HashSet<_> = updates.iter().map(|u| u.id).collect();
        assert_eq!(reported.len(), updates.len());
        assert_eq!(updates[0], update("c", "todo", 18));
        assert!(reported.contains("a") && reported.contains("b"));
    }

    #[test]
    fn test_compact_renumbers_and_reports_changes() {
        let mut b = board(
            &["todo"],
            vec![
                card("a", "todo", 1000),
                card("b", "todo", 1000),
                card("c", "todo", 5000),
            ],
        );

        let updates = Reconciler::default().compact(&mut b, &"todo").unwrap();

        assert_eq!(positions(&b, "todo"), vec![1000, 2000, 3000]);
        assert_eq!(
            updates,
            vec![update("b", "todo", 2000), update("c", "todo", 3000)]
        );
        assert!(Reconciler::default().compact(&mut b, &"nope").is_err());
    }

    #[test]
    fn test_compact_rejects_bucket_larger_than_ceiling() {
        let policy = PositionPolicy::new(1, 3).unwrap();
        let mut b = board(
            &["todo"],
            vec![
                card("a", "todo", 3),
                card("b", "todo", 3),
                card("c", "todo", 3),
                card("d", "todo", 3),
            ],
        );

        let reconciler = Reconciler::new(policy);
        let err = reconciler.compact(&mut b, &"todo").unwrap_err();
        assert!(matches!(err, BoardError::Validation(_)));
        assert_eq!(positions(&b, "todo"), vec![3, 3, 3, 3]);

        // auto-compaction skips the bucket instead of failing the move
        let (after, _) = reconciler
            .with_auto_compact(true)
            .apply_move(&b, &Move::new("todo", 0, "todo", 3))
            .unwrap();
        assert_eq!(positions(&after, "todo"), vec![1, 2, 3, 3]);
    }

    #[test]
    fn test_every_move_preserves_invariants() {
        let buckets = ["backlog", "todo", "done"];
        let start = board(
            &buckets,
            vec![
                card("a", "backlog", 1000),
                card("b", "backlog", 2000),
                card("c", "todo", 1500),
                card("d", "todo", 1500),
                card("e", "todo", 9000),
                card("f", "done", 3),
            ],
        );
        let reconciler = Reconciler::default();

        for source in buckets {
            for source_index in 0..start.cards(&source).len() {
                for dest in buckets {
                    let dest_len = start.cards(&dest).len() - usize::from(source == dest);
                    for dest_index in 0..=dest_len {
                        let mv = Move::new(source, source_index, dest, dest_index);
                        let moved_id = start.cards(&source)[source_index].id;
                        let (after, updates) = reconciler.apply_move(&start, &mv).unwrap();

                        after.check_invariants().unwrap();
                        assert_eq!(after.len(), start.len());

                        for (bucket, cards) in after.iter() {
                            if *bucket == source || *bucket == dest {
                                assert!(cards.windows(2).all(|w| w[0].position < w[1].position));
                                for (i, c) in cards.iter().enumerate() {
                                    assert_eq!(c.position, ((i as i32) + 1) * 1000);
                                }
                            }
                        }

                        assert_eq!(updates[0].id, moved_id);
                        assert_eq!(updates[0].bucket, dest);
                        assert_eq!(after.find(&moved_id), Some((&dest, dest_index)));

                        let unique: HashSet<_> = updates.iter().map(|u| u.id).collect();
                        assert_eq!(unique.len(), updates.len());

                        for u in &updates[1..] {
                            let (old_bucket, old_index) = start.find(&u.id).unwrap();
                            let old = &start.cards(old_bucket)[old_index];
                            assert!(
                                old.bucket != u.bucket || old.position != u.position,
                                "{} reported without a change",
                                u.id
                            );
                        }
                    }
                }
            }
        }
    }
}
