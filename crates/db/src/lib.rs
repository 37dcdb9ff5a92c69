//! Document store abstraction and the engines the bookstore can connect to.

use std::sync::Arc;

use async_trait::async_trait;

pub mod document;
pub mod error;
pub mod memory;

pub use document::{Document, DocumentId, Fields};
pub use error::{DbError, DbResult};
pub use memory::MemoryStore;

/// Identifier-addressed document operations, scoped by collection name.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents of a collection in insertion order.
    async fn find_all(&self, collection: &str) -> DbResult<Vec<Document>>;

    async fn find_by_id(&self, collection: &str, id: &DocumentId) -> DbResult<Option<Document>>;

    /// Persist `fields` as a new document with a generated id and fresh timestamps.
    async fn insert(&self, collection: &str, fields: Fields) -> DbResult<Document>;

    /// Merge `changes` into an existing document, returning the updated state.
    async fn update_by_id(
        &self,
        collection: &str,
        id: &DocumentId,
        changes: Fields,
    ) -> DbResult<Option<Document>>;

    /// Remove a document, returning what was removed.
    async fn delete_by_id(&self, collection: &str, id: &DocumentId) -> DbResult<Option<Document>>;
}

/// Open the document store named by `endpoint`.
///
/// Supported endpoints are `memory://` and `file://<path>`.
pub async fn connect(endpoint: &str) -> DbResult<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match endpoint.split_once("://") {
        Some(("memory", "")) => Arc::new(MemoryStore::new()),
        Some(("file", path)) if !path.is_empty() => Arc::new(MemoryStore::open(path).await?),
        _ => return Err(DbError::InvalidEndpoint(endpoint.to_string())),
    };

    tracing::info!(target: "bookstore-db", endpoint, "document store connected");
    Ok(store)
}
