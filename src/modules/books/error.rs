use bookstore_db::DbError;
use bookstore_http::AppError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

pub type BookResult<T> = Result<T, BookError>;

/// A rejected field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    #[serde(rename = "error")]
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum BookError {
    #[error("Cannot find book with id: {0}")]
    NotFound(String),

    #[error("'{0}' is not a valid book id")]
    InvalidIdentifier(String),

    #[error("Book validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("stored book {id} has a missing or mistyped '{field}'")]
    Malformed { id: String, field: &'static str },

    #[error(transparent)]
    Store(DbError),
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<DbError> for BookError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::InvalidId(id) => BookError::InvalidIdentifier(id),
            other => BookError::Store(other),
        }
    }
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::NotFound(_) => AppError::not_found(err.to_string()),
            BookError::InvalidIdentifier(ref id) => AppError::bad_request_with(
                vec![json!({"field": "id", "error": format!("'{id}' is not a valid identifier")})],
                err.to_string(),
            ),
            BookError::Validation(ref errors) => {
                let details = errors
                    .iter()
                    .map(|e| json!({"field": e.field, "error": e.message}))
                    .collect();
                AppError::validation(details, err.to_string())
            }
            BookError::Malformed { .. } | BookError::Store(_) => {
                AppError::Internal(anyhow::Error::new(err))
            }
        }
    }
}
