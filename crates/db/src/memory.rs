//! In-process document engine with optional JSON snapshot persistence.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::document::{Document, DocumentId, Fields};
use crate::error::DbResult;
use crate::DocumentStore;

type Collections = BTreeMap<String, Vec<Document>>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    collections: Collections,
}

/// Document store held in memory; collections keep insertion order.
///
/// When opened with a snapshot path every successful write is flushed to that
/// file before the write is acknowledged. A failed flush undoes the write.
/// Lookups that miss never create a collection.
pub struct MemoryStore {
    collections: RwLock<Collections>,
    snapshot: Option<PathBuf>,
}

impl MemoryStore {
    /// Create an empty, purely in-memory store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(Collections::new()),
            snapshot: None,
        }
    }

    /// Open a store backed by the snapshot file at `path`, loading it if present.
    pub async fn open(path: impl Into<PathBuf>) -> DbResult<Self> {
        let path = path.into();
        let snapshot = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Snapshot>(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(err) => return Err(err.into()),
        };

        tracing::info!(
            target: "bookstore-db",
            path = %path.display(),
            collections = snapshot.collections.len(),
            "snapshot loaded"
        );

        Ok(Self {
            collections: RwLock::new(snapshot.collections),
            snapshot: Some(path),
        })
    }

    /// Persist a write that has already been applied to `collections`.
    ///
    /// If the flush fails, `undo` reverses that write before the error is returned.
    async fn flush(
        &self,
        collections: &mut Collections,
        collection: &str,
        undo: Undo,
    ) -> DbResult<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };

        if let Err(err) = write_snapshot(path, collections).await {
            tracing::error!(
                target: "bookstore-db",
                path = %path.display(),
                error = %err,
                "snapshot flush failed, write rolled back"
            );
            undo.revert(collections, collection);
            return Err(err);
        }
        Ok(())
    }
}

/// Inverse of a single write.
enum Undo {
    /// Drop the document appended last.
    Insert,
    /// Put back the document that stood at this index before an update.
    Replace(usize, Document),
    /// Re-insert a deleted document at its old index.
    Restore(usize, Document),
}

impl Undo {
    fn revert(self, collections: &mut Collections, collection: &str) {
        let Some(documents) = collections.get_mut(collection) else {
            return;
        };
        match self {
            Undo::Insert => {
                documents.pop();
            }
            Undo::Replace(index, document) => documents[index] = document,
            Undo::Restore(index, document) => documents.insert(index, document),
        }
        if documents.is_empty() {
            collections.remove(collection);
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

async fn write_snapshot(path: &Path, collections: &Collections) -> DbResult<()> {
    #[derive(Serialize)]
    struct SnapshotRef<'a> {
        collections: &'a Collections,
    }

    let bytes = serde_json::to_vec_pretty(&SnapshotRef { collections })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    // Write next to the target and rename so readers never see a torn file.
    let staging = path.with_extension("json.tmp");
    tokio::fs::write(&staging, bytes).await?;
    if let Err(err) = tokio::fs::rename(&staging, path).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(err.into());
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_all(&self, collection: &str) -> DbResult<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    async fn find_by_id(&self, collection: &str, id: &DocumentId) -> DbResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.iter().find(|doc| doc.id == *id))
            .cloned())
    }

    async fn insert(&self, collection: &str, fields: Fields) -> DbResult<Document> {
        let document = Document::new(fields);
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());

        self.flush(&mut collections, collection, Undo::Insert).await?;
        Ok(document)
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &DocumentId,
        changes: Fields,
    ) -> DbResult<Option<Document>> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(index) = documents.iter().position(|doc| doc.id == *id) else {
            return Ok(None);
        };

        let previous = documents[index].clone();
        documents[index].apply(changes);
        let updated = documents[index].clone();

        self.flush(&mut collections, collection, Undo::Replace(index, previous))
            .await?;
        Ok(Some(updated))
    }

    async fn delete_by_id(&self, collection: &str, id: &DocumentId) -> DbResult<Option<Document>> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(index) = documents.iter().position(|doc| doc.id == *id) else {
            return Ok(None);
        };

        let removed = documents.remove(index);

        self.flush(&mut collections, collection, Undo::Restore(index, removed.clone()))
            .await?;
        Ok(Some(removed))
    }
}
