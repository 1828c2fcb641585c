use dealboard_core::{AppConfig, BoardItem, BoardResult};
use dealboard_domain::{PositionPolicy, PositionUpdate, Reconciler, Workspace};
use dealboard_persistence::{PositionSink, WorkspaceStore};
use std::path::Path;

pub struct CliContext {
    pub workspace: Workspace,
    pub reconciler: Reconciler,
    store: WorkspaceStore,
}

impl CliContext {
    pub async fn load(file_path: &str, config: &AppConfig) -> BoardResult<Self> {
        let store = WorkspaceStore::new(file_path);
        let workspace = store.load().await?;
        Ok(Self {
            workspace,
            reconciler: Reconciler::from_config(config)?,
            store,
        })
    }

    pub fn policy(&self) -> &PositionPolicy {
        self.reconciler.policy()
    }

    pub fn file_path(&self) -> &Path {
        self.store.path()
    }

    pub async fn save(&self) -> BoardResult<()> {
        self.store.save(&self.workspace).await?;
        Ok(())
    }

    /// Send reconciled updates to the store and fold them into the loaded
    /// workspace copy.
    pub async fn persist<C>(
        &mut self,
        updates: &[PositionUpdate<C::Id, C::Bucket>],
    ) -> BoardResult<usize>
    where
        C: BoardItem,
        C::Id: Send + Sync,
        C::Bucket: Send + Sync,
        WorkspaceStore: PositionSink<C>,
    {
        if updates.is_empty() {
            return Ok(0);
        }
        let written = PositionSink::<C>::apply_updates(&self.store, updates).await?;
        self.workspace = self.store.load().await?;
        Ok(written)
    }
}
