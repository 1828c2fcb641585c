pub mod board;
pub mod deal;
pub mod pipeline;
pub mod stage;
pub mod task;
