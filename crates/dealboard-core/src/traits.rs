use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A card that can live on an ordered board.
///
/// The board only ever looks at `bucket` and `position`; everything else on
/// the record (title, value, due date, ...) is carried along untouched. Tasks
/// bucket by status, deals bucket by pipeline stage.
pub trait BoardItem: Clone {
    type Id: Clone + Eq + Hash + Debug + Display;
    type Bucket: Clone + Eq + Hash + Debug + Display;

    fn id(&self) -> &Self::Id;
    fn bucket(&self) -> &Self::Bucket;
    fn position(&self) -> i32;

    fn set_bucket(&mut self, bucket: Self::Bucket);
    fn set_position(&mut self, position: i32);
}
