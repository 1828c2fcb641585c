use async_trait::async_trait;
use dealboard_core::{BoardError, BoardResult};
use dealboard_domain::{Deal, DealId, PositionUpdate, Task, TaskId, TaskStatus, Workspace};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::store::atomic_writer::AtomicWriter;
use crate::traits::{PersistenceMetadata, PositionSink, FORMAT_VERSION};

/// On-disk layout of a workspace file.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonEnvelope {
    pub version: u32,
    pub metadata: PersistenceMetadata,
    pub data: Workspace,
}

impl JsonEnvelope {
    pub fn empty() -> Self {
        Self {
            version: FORMAT_VERSION,
            metadata: PersistenceMetadata::new(Uuid::nil()),
            data: Workspace::default(),
        }
    }

    pub fn to_json_string(&self) -> BoardResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| BoardError::Serialization(e.to_string()))
    }
}

/// JSON file holding one workspace. Doubles as the position sink for both
/// task and deal boards: every batch is a load, an all-or-nothing upsert and
/// an atomic save, serialised per store.
#[derive(Debug)]
pub struct WorkspaceStore {
    path: PathBuf,
    instance_id: Uuid,
    write_lock: Mutex<()>,
}

impl WorkspaceStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_instance_id(path, Uuid::new_v4())
    }

    pub fn with_instance_id(path: impl AsRef<Path>, instance_id: Uuid) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            instance_id,
            write_lock: Mutex::new(()),
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        fs_exists(&self.path).await
    }

    /// Load the workspace. A missing file reads as an empty workspace.
    pub async fn load(&self) -> BoardResult<Workspace> {
        if !self.exists().await {
            tracing::info!("No workspace at {}, starting empty", self.path.display());
            return Ok(Workspace::default());
        }

        let bytes = AtomicWriter::read_all(&self.path).await?;
        let envelope: JsonEnvelope = serde_json::from_slice(&bytes)
            .map_err(|e| BoardError::Serialization(e.to_string()))?;

        if envelope.version != FORMAT_VERSION {
            return Err(BoardError::Serialization(format!(
                "Unsupported format version: {}",
                envelope.version
            )));
        }

        tracing::info!(
            "Loaded {} tasks, {} deals, {} stages from {}",
            envelope.data.tasks.len(),
            envelope.data.deals.len(),
            envelope.data.stages.len(),
            self.path.display()
        );
        Ok(envelope.data)
    }

    pub async fn save(&self, workspace: &Workspace) -> BoardResult<PersistenceMetadata> {
        let envelope = JsonEnvelope {
            version: FORMAT_VERSION,
            metadata: PersistenceMetadata::new(self.instance_id),
            data: workspace.clone(),
        };
        let json = serde_json::to_vec_pretty(&envelope)
            .map_err(|e| BoardError::Serialization(e.to_string()))?;

        AtomicWriter::write_atomic(&self.path, &json).await?;

        tracing::info!("Saved {} bytes to {}", json.len(), self.path.display());
        Ok(envelope.metadata)
    }

    /// Load, mutate and save under the store's write lock. Nothing is written
    /// when `mutate` fails.
    pub async fn update<T>(
        &self,
        mutate: impl FnOnce(&mut Workspace) -> BoardResult<T> + Send,
    ) -> BoardResult<T> {
        let _guard = self.write_lock.lock().await;
        let mut workspace = self.load().await?;
        let result = mutate(&mut workspace)?;
        self.save(&workspace).await?;
        Ok(result)
    }
}

async fn fs_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

#[async_trait]
impl PositionSink<Task> for WorkspaceStore {
    async fn apply_updates(
        &self,
        updates: &[PositionUpdate<TaskId, TaskStatus>],
    ) -> BoardResult<usize> {
        self.update(|workspace| workspace.apply_task_updates(updates))
            .await
    }
}

#[async_trait]
impl PositionSink<Deal> for WorkspaceStore {
    async fn apply_updates(
        &self,
        updates: &[PositionUpdate<DealId, String>],
    ) -> BoardResult<usize> {
        self.update(|workspace| workspace.apply_deal_updates(updates))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealboard_domain::{Move, PositionPolicy, Reconciler};
    use tempfile::tempdir;

    async fn seeded_store(path: &Path) -> WorkspaceStore {
        let store = WorkspaceStore::new(path);
        let policy = PositionPolicy::default();
        let mut workspace = Workspace::default();
        workspace.add_task("a".to_string(), TaskStatus::Todo, &policy);
        workspace.add_task("b".to_string(), TaskStatus::Todo, &policy);
        workspace.add_stage("Lead".to_string(), 1).unwrap();
        workspace.add_stage("Won".to_string(), 2).unwrap();
        workspace
            .add_deal("Acme".to_string(), "Lead".to_string(), 10.0, &policy)
            .unwrap();
        store.save(&workspace).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = WorkspaceStore::new(dir.path().join("missing.json"));

        assert!(!store.exists().await);
        let workspace = store.load().await.unwrap();
        assert!(workspace.tasks.is_empty());
        assert!(workspace.stages.is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("board.json");
        let store = seeded_store(&path).await;

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.tasks.len(), 2);
        assert_eq!(loaded.deals.len(), 1);
        assert_eq!(loaded.stages.len(), 2);

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["version"], 1);
        assert_eq!(raw["metadata"]["instance_id"], store.instance_id().to_string());
        assert_eq!(raw["data"]["tasks"][0]["status"], "todo");
    }

    #[tokio::test]
    async fn test_rejects_unknown_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("board.json");
        let mut envelope = JsonEnvelope::empty();
        envelope.version = 7;
        std::fs::write(&path, envelope.to_json_string().unwrap()).unwrap();

        let err = WorkspaceStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, BoardError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_task_updates_are_persisted() {
        let dir = tempdir().unwrap();
        let store = seeded_store(&dir.path().join("board.json")).await;

        let board = store.load().await.unwrap().task_board().unwrap();
        let (_, updates) = Reconciler::default()
            .apply_move(&board, &Move::new(TaskStatus::Todo, 1, TaskStatus::InProgress, 0))
            .unwrap();

        let written = PositionSink::<Task>::apply_updates(&store, &updates)
            .await
            .unwrap();
        assert_eq!(written, 1);

        let reloaded = store.load().await.unwrap().task_board().unwrap();
        assert_eq!(reloaded.cards(&TaskStatus::InProgress)[0].title, "b");
        assert_eq!(reloaded.cards(&TaskStatus::Todo).len(), 1);
    }

    #[tokio::test]
    async fn test_deal_updates_are_persisted() {
        let dir = tempdir().unwrap();
        let store = seeded_store(&dir.path().join("board.json")).await;

        let board = store.load().await.unwrap().deal_board().unwrap();
        let (_, updates) = Reconciler::default()
            .apply_move(
                &board,
                &Move::new("Lead".to_string(), 0, "Won".to_string(), 0),
            )
            .unwrap();

        PositionSink::<Deal>::apply_updates(&store, &updates)
            .await
            .unwrap();

        let reloaded = store.load().await.unwrap();
        assert_eq!(reloaded.deals[0].stage, "Won");
        assert_eq!(reloaded.deals[0].position, 1000);
    }

    #[tokio::test]
    async fn test_failed_batch_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("board.json");
        let store = seeded_store(&path).await;
        let before = std::fs::read(&path).unwrap();

        let updates = vec![PositionUpdate {
            id: Uuid::new_v4(),
            bucket: TaskStatus::Done,
            position: 1000,
        }];
        let err = PositionSink::<Task>::apply_updates(&store, &updates)
            .await
            .unwrap_err();

        assert!(matches!(err, BoardError::NotFound(_)));
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }
}
