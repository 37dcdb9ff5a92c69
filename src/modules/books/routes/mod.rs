//! HTTP handlers for the books module.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::get,
    Json, Router,
};
use bookstore_db::Fields;
use bookstore_http::{ApiResponse, AppError};

use super::models::Book;
use super::repository::BookRepository;

type Repository = State<Arc<BookRepository>>;
type Body = Result<Json<Fields>, JsonRejection>;

/// Routes relative to the module mount point.
pub fn router(repository: Arc<BookRepository>) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(repository)
}

async fn list_books(State(repository): Repository) -> Result<ApiResponse<Vec<Book>>, AppError> {
    let books = repository.list_all().await?;
    tracing::debug!(count = books.len(), "books listed");
    Ok(ApiResponse::ok(books))
}

async fn get_book(
    State(repository): Repository,
    Path(id): Path<String>,
) -> Result<ApiResponse<Book>, AppError> {
    Ok(ApiResponse::ok(repository.get_by_id(&id).await?))
}

async fn create_book(
    State(repository): Repository,
    body: Body,
) -> Result<ApiResponse<Book>, AppError> {
    let Json(fields) = body?;
    Ok(ApiResponse::created(repository.create(fields).await?))
}

async fn update_book(
    State(repository): Repository,
    Path(id): Path<String>,
    body: Body,
) -> Result<ApiResponse<Book>, AppError> {
    let Json(fields) = body?;
    Ok(ApiResponse::ok(repository.update_by_id(&id, fields).await?))
}

// A missing id answers 404 here, the same as get and update.
async fn delete_book(
    State(repository): Repository,
    Path(id): Path<String>,
) -> Result<ApiResponse<Book>, AppError> {
    Ok(ApiResponse::ok(repository.delete_by_id(&id).await?))
}
