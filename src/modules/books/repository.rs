//! Book persistence on top of a document store.

use std::sync::Arc;

use bookstore_db::{DocumentId, DocumentStore, Fields};

use super::error::{BookError, BookResult};
use super::models::{self, Book};

/// Identifier-addressed CRUD over the book collection.
pub struct BookRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl BookRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Every book, in insertion order.
    pub async fn list_all(&self) -> BookResult<Vec<Book>> {
        self.store
            .find_all(&self.collection)
            .await?
            .into_iter()
            .map(Book::try_from)
            .collect()
    }

    pub async fn get_by_id(&self, id: &str) -> BookResult<Book> {
        let document_id = parse_id(id)?;
        self.store
            .find_by_id(&self.collection, &document_id)
            .await?
            .ok_or_else(|| BookError::NotFound(id.to_string()))?
            .try_into()
    }

    /// Validate `fields` against the book schema and persist a new book.
    pub async fn create(&self, fields: Fields) -> BookResult<Book> {
        let accepted = models::validate_new(&fields)?;
        let book = Book::try_from(self.store.insert(&self.collection, accepted).await?)?;

        tracing::info!(book_id = %book.id, collection = %self.collection, "book created");
        Ok(book)
    }

    /// Apply the provided client-writable fields to an existing book.
    pub async fn update_by_id(&self, id: &str, fields: Fields) -> BookResult<Book> {
        let document_id = parse_id(id)?;
        let changes = models::validate_changes(&fields)?;

        let book: Book = self
            .store
            .update_by_id(&self.collection, &document_id, changes)
            .await?
            .ok_or_else(|| BookError::NotFound(id.to_string()))?
            .try_into()?;

        tracing::info!(book_id = %book.id, revision = book.revision, "book updated");
        Ok(book)
    }

    /// Remove a book, returning the removed record.
    pub async fn delete_by_id(&self, id: &str) -> BookResult<Book> {
        let document_id = parse_id(id)?;

        let book: Book = self
            .store
            .delete_by_id(&self.collection, &document_id)
            .await?
            .ok_or_else(|| BookError::NotFound(id.to_string()))?
            .try_into()?;

        tracing::info!(book_id = %book.id, "book deleted");
        Ok(book)
    }
}

fn parse_id(id: &str) -> BookResult<DocumentId> {
    Ok(id.parse::<DocumentId>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_db::MemoryStore;
    use serde_json::{json, Value};

    fn repository() -> BookRepository {
        BookRepository::new(Arc::new(MemoryStore::new()), "books")
    }

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn dune() -> Fields {
        fields(json!({"title": "Dune", "author": "Frank Herbert", "price": 25}))
    }

    #[tokio::test]
    async fn create_then_get_returns_same_book() {
        let repository = repository();
        let created = repository.create(dune()).await.unwrap();

        assert_eq!(created.title, "Dune");
        assert_eq!(created.author, "Frank Herbert");
        assert_eq!(created.price, 25.0);
        assert_eq!(created.revision, 0);
        assert_eq!(created.created_at, created.updated_at);

        let fetched = repository.get_by_id(&created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn create_assigns_fresh_ids() {
        let repository = repository();
        let first = repository.create(dune()).await.unwrap();
        let second = repository.create(dune()).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn create_without_required_field_fails_validation() {
        let repository = repository();
        for missing in ["title", "author", "price"] {
            let mut input = dune();
            input.remove(missing);

            match repository.create(input).await.unwrap_err() {
                BookError::Validation(errors) => {
                    assert_eq!(errors.len(), 1);
                    assert_eq!(errors[0].field, missing);
                }
                other => panic!("expected validation error, got {other:?}"),
            }
        }
        assert!(repository.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let repository = repository();
        let id = DocumentId::generate().to_string();

        match repository.get_by_id(&id).await.unwrap_err() {
            BookError::NotFound(missing) => assert_eq!(missing, id),
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_id_is_invalid_identifier() {
        let repository = repository();
        let err = repository.get_by_id("not-an-id").await.unwrap_err();
        assert!(matches!(err, BookError::InvalidIdentifier(ref id) if id == "not-an-id"));

        let err = repository.delete_by_id("42").await.unwrap_err();
        assert!(matches!(err, BookError::InvalidIdentifier(_)));
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let repository = repository();
        let created = repository.create(dune()).await.unwrap();

        let updated = repository
            .update_by_id(&created.id, fields(json!({"price": 30})))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.author, created.author);
        assert_eq!(updated.price, 30.0);
        assert_eq!(updated.revision, 1);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let repository = repository();
        let id = DocumentId::generate().to_string();
        let err = repository
            .update_by_id(&id, fields(json!({"title": "Emma"})))
            .await
            .unwrap_err();
        assert!(matches!(err, BookError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_rejects_blank_title() {
        let repository = repository();
        let created = repository.create(dune()).await.unwrap();

        let err = repository
            .update_by_id(&created.id, fields(json!({"title": ""})))
            .await
            .unwrap_err();
        assert!(matches!(err, BookError::Validation(_)));
        assert_eq!(repository.get_by_id(&created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn delete_removes_book() {
        let repository = repository();
        let created = repository.create(dune()).await.unwrap();

        let deleted = repository.delete_by_id(&created.id).await.unwrap();
        assert_eq!(deleted, created);

        let err = repository.get_by_id(&created.id).await.unwrap_err();
        assert!(matches!(err, BookError::NotFound(_)));
        let err = repository.delete_by_id(&created.id).await.unwrap_err();
        assert!(matches!(err, BookError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_returns_every_created_book_in_order() {
        let repository = repository();
        let titles = ["Dune", "Emma", "Ulysses"];
        for title in titles {
            let mut input = dune();
            input.insert("title".into(), json!(title));
            repository.create(input).await.unwrap();
        }

        let books = repository.list_all().await.unwrap();
        assert_eq!(books.len(), titles.len());
        for (book, title) in books.iter().zip(titles) {
            assert_eq!(book.title, title);
            assert_eq!(book.author, "Frank Herbert");
        }
    }
}
