pub mod atomic_writer;
pub mod workspace_store;

pub use atomic_writer::AtomicWriter;
pub use workspace_store::{JsonEnvelope, WorkspaceStore};
