pub mod store;
pub mod sync;
pub mod traits;

pub use store::*;
pub use sync::persist_pending;
pub use traits::*;
