//! Spaced integer positions.
//!
//! Cards are numbered `1 * step, 2 * step, ...` so that a future insert has
//! room between two neighbours. Positions never exceed `ceiling`; a bucket
//! holding more than `ceiling / step` cards therefore piles its tail up on the
//! ceiling, which is what [`PositionPolicy::is_exhausted`] detects.
//!
//! Compaction can restore a strict order only while a bucket holds at most
//! `ceiling` cards, one distinct value per card.

use dealboard_core::config::{DEFAULT_POSITION_CEILING, DEFAULT_POSITION_STEP};
use dealboard_core::{AppConfig, BoardError, BoardItem, BoardResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionPolicy {
    step: i32,
    ceiling: i32,
}

impl Default for PositionPolicy {
    fn default() -> Self {
        Self {
            step: DEFAULT_POSITION_STEP,
            ceiling: DEFAULT_POSITION_CEILING,
        }
    }
}

impl PositionPolicy {
    pub fn new(step: i32, ceiling: i32) -> BoardResult<Self> {
        if step <= 0 || ceiling < step {
            return Err(BoardError::Validation(format!(
                "invalid position policy: step {} ceiling {}",
                step, ceiling
            )));
        }
        Ok(Self { step, ceiling })
    }

    pub fn from_config(config: &AppConfig) -> BoardResult<Self> {
        config.validate()?;
        Self::new(config.position_step, config.position_ceiling)
    }

    pub fn step(&self) -> i32 {
        self.step
    }

    pub fn ceiling(&self) -> i32 {
        self.ceiling
    }

    /// `min((index + 1) * step, ceiling)`
    pub fn position_for(&self, index: usize) -> i32 {
        Self::spaced(index, self.step, self.ceiling)
    }

    /// Position for a card appended after `positions`: past the highest
    /// existing position, and never below the regular slot for the new
    /// index. Clamped to the ceiling.
    pub fn append_position(&self, positions: impl IntoIterator<Item = i32>) -> i32 {
        let mut count = 0;
        let mut highest = None;
        for position in positions {
            count += 1;
            highest = highest.max(Some(position));
        }
        let after_highest = highest.map_or(0, |p: i32| p.saturating_add(self.step));
        after_highest
            .min(self.ceiling)
            .max(self.position_for(count))
    }

    /// How many cards fit in one bucket before positions collide.
    pub fn capacity(&self) -> usize {
        (self.ceiling / self.step) as usize
    }

    /// Position for `index` when a bucket of `len` cards is renumbered.
    ///
    /// Buckets within capacity get the regular spacing; larger ones are spread
    /// evenly under the ceiling with a step of at least 1.
    pub fn compacted_position(&self, index: usize, len: usize) -> i32 {
        let step = if len <= self.capacity() {
            self.step
        } else {
            let len = i64::try_from(len).unwrap_or(i64::MAX);
            (i64::from(self.ceiling) / len).max(1) as i32
        };
        Self::spaced(index, step, self.ceiling)
    }

    /// Whether compacting `len` cards yields strictly increasing positions.
    pub fn can_compact(&self, len: usize) -> bool {
        usize::try_from(self.ceiling).is_ok_and(|ceiling| len <= ceiling)
    }

    /// A bucket is exhausted once it outgrows its capacity or two neighbours
    /// no longer have strictly increasing positions.
    pub fn is_exhausted<C: BoardItem>(&self, cards: &[C]) -> bool {
        cards.len() > self.capacity()
            || cards
                .windows(2)
                .any(|pair| pair[0].position() >= pair[1].position())
    }

    fn spaced(index: usize, step: i32, ceiling: i32) -> i32 {
        let slot = i64::try_from(index)
            .unwrap_or(i64::MAX)
            .saturating_add(1)
            .saturating_mul(i64::from(step));
        slot.min(i64::from(ceiling)) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Task, TaskStatus};

    #[test]
    fn test_position_formula() {
        let policy = PositionPolicy::default();
        assert_eq!(policy.position_for(0), 1000);
        assert_eq!(policy.position_for(1), 2000);
        assert_eq!(policy.position_for(998), 999_000);
        assert_eq!(policy.position_for(999), 1_000_000);
        assert_eq!(policy.position_for(1000), 1_000_000);
        assert_eq!(policy.position_for(usize::MAX - 1), 1_000_000);
    }

    #[test]
    fn test_capacity() {
        assert_eq!(PositionPolicy::default().capacity(), 1000);
        assert_eq!(PositionPolicy::new(10, 95).unwrap().capacity(), 9);
    }

    #[test]
    fn test_invalid_policy() {
        assert!(PositionPolicy::new(0, 100).is_err());
        assert!(PositionPolicy::new(100, 10).is_err());
    }

    #[test]
    fn test_compacted_position_spreads_large_buckets() {
        let policy = PositionPolicy::new(10, 100).unwrap();
        // within capacity: regular spacing
        assert_eq!(policy.compacted_position(2, 10), 30);
        // 20 cards under a ceiling of 100: step 5
        let positions: Vec<_> = (0..20).map(|i| policy.compacted_position(i, 20)).collect();
        assert_eq!(positions[0], 5);
        assert_eq!(positions[19], 100);
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_append_position_goes_past_gaps() {
        let policy = PositionPolicy::default();
        assert_eq!(policy.append_position([]), 1000);
        assert_eq!(policy.append_position([1000, 2000]), 3000);
        assert_eq!(policy.append_position([1000, 9000]), 10_000);
        // dense slot wins when existing positions are packed low
        assert_eq!(policy.append_position([1, 2, 3]), 4000);
        assert_eq!(policy.append_position([999_500]), 1_000_000);
    }

    #[test]
    fn test_can_compact_up_to_ceiling() {
        let policy = PositionPolicy::new(10, 30).unwrap();
        assert!(policy.can_compact(30));
        assert!(!policy.can_compact(31));
    }

    #[test]
    fn test_is_exhausted() {
        let policy = PositionPolicy::new(10, 30).unwrap();
        let task = |p| Task::new("t".to_string(), TaskStatus::Todo, p);

        assert!(!policy.is_exhausted(&[task(10), task(20)]));
        assert!(policy.is_exhausted(&[task(30), task(30)]));
        assert!(policy.is_exhausted(&[task(1), task(2), task(3), task(4)]));
        assert!(!policy.is_exhausted::<Task>(&[]));
    }
}
