use bookstore_db::{Document, Fields};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use super::error::{BookError, FieldError};

/// A persisted book as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Store-generated identifier
    pub id: String,
    pub title: String,
    pub author: String,
    pub price: f64,
    /// When the book was first added
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the book was last modified
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Store revision, bumped on every update
    pub revision: u64,
}

impl TryFrom<Document> for Book {
    type Error = BookError;

    fn try_from(document: Document) -> Result<Self, Self::Error> {
        let id = document.id.to_string();
        let malformed = |field: &'static str| BookError::Malformed {
            id: id.clone(),
            field,
        };

        let title = text(&document, TITLE.name).ok_or_else(|| malformed(TITLE.name))?;
        let author = text(&document, AUTHOR.name).ok_or_else(|| malformed(AUTHOR.name))?;
        let price = document
            .get(PRICE.name)
            .and_then(Value::as_f64)
            .ok_or_else(|| malformed(PRICE.name))?;

        Ok(Book {
            id: id.clone(),
            title,
            author,
            price,
            created_at: document.created_at,
            updated_at: document.updated_at,
            revision: document.revision,
        })
    }
}

fn text(document: &Document, field: &str) -> Option<String> {
    document.get(field).and_then(Value::as_str).map(str::to_string)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Number,
}

/// One client-writable field of the book schema.
#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    name: &'static str,
    kind: FieldKind,
    required_message: &'static str,
}

const TITLE: FieldSpec = FieldSpec {
    name: "title",
    kind: FieldKind::Text,
    required_message: "Please enter a book title",
};

const AUTHOR: FieldSpec = FieldSpec {
    name: "author",
    kind: FieldKind::Text,
    required_message: "Please enter an author's name",
};

const PRICE: FieldSpec = FieldSpec {
    name: "price",
    kind: FieldKind::Number,
    required_message: "Please enter the book price",
};

const BOOK_SCHEMA: [FieldSpec; 3] = [TITLE, AUTHOR, PRICE];

impl FieldSpec {
    /// Check a provided value; null and blank text count as missing.
    fn check(&self, value: &Value) -> Result<(), FieldError> {
        match (self.kind, value) {
            (_, Value::Null) => Err(FieldError::new(self.name, self.required_message)),
            (FieldKind::Text, Value::String(s)) if s.trim().is_empty() => {
                Err(FieldError::new(self.name, self.required_message))
            }
            (FieldKind::Text, Value::String(_)) | (FieldKind::Number, Value::Number(_)) => Ok(()),
            (FieldKind::Text, _) => Err(FieldError::new(
                self.name,
                format!("{} must be a string", self.name),
            )),
            (FieldKind::Number, _) => Err(FieldError::new(
                self.name,
                format!("{} must be a number", self.name),
            )),
        }
    }
}

/// Validated fields for a new book.
///
/// Every schema field must be present; anything outside the schema is dropped.
pub fn validate_new(input: &Fields) -> Result<Fields, BookError> {
    let mut accepted = Fields::new();
    let mut errors = Vec::new();

    for spec in BOOK_SCHEMA {
        match input.get(spec.name) {
            None => errors.push(FieldError::new(spec.name, spec.required_message)),
            Some(value) => match spec.check(value) {
                Ok(()) => {
                    accepted.insert(spec.name.to_string(), value.clone());
                }
                Err(err) => errors.push(err),
            },
        }
    }

    if errors.is_empty() {
        Ok(accepted)
    } else {
        Err(BookError::Validation(errors))
    }
}

/// Validated partial update; only schema fields that were provided are kept.
pub fn validate_changes(input: &Fields) -> Result<Fields, BookError> {
    let mut accepted = Fields::new();
    let mut errors = Vec::new();

    for spec in BOOK_SCHEMA {
        let Some(value) = input.get(spec.name) else {
            continue;
        };
        match spec.check(value) {
            Ok(()) => {
                accepted.insert(spec.name.to_string(), value.clone());
            }
            Err(err) => errors.push(err),
        }
    }

    if errors.is_empty() {
        Ok(accepted)
    } else {
        Err(BookError::Validation(errors))
    }
}
