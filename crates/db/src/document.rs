use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::DbError;

/// Schema-free field map stored in a document.
pub type Fields = serde_json::Map<String, Value>;

/// Store-generated document identifier (time-ordered UUIDv7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl FromStr for DocumentId {
    type Err = DbError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::try_parse(value)
            .map(Self)
            .map_err(|_| DbError::InvalidId(value.to_string()))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

/// A stored record together with its store-maintained metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub fields: Fields,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Incremented on every update, starting at 0.
    pub revision: u64,
}

impl Document {
    pub(crate) fn new(fields: Fields) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: DocumentId::generate(),
            fields,
            created_at: now,
            updated_at: now,
            revision: 0,
        }
    }

    /// Merge `changes` over the stored fields and advance the metadata.
    pub(crate) fn apply(&mut self, changes: Fields) {
        for (key, value) in changes {
            self.fields.insert(key, value);
        }
        self.updated_at = next_timestamp(self.updated_at);
        self.revision += 1;
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// Current time, nudged forward so consecutive writes never share a timestamp.
fn next_timestamp(previous: OffsetDateTime) -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    if now > previous {
        now
    } else {
        previous + time::Duration::nanoseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_id_round_trips_through_display() {
        let id = DocumentId::generate();
        let parsed: DocumentId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn malformed_document_id_is_rejected() {
        let err = "6449b28d0efd053def76bf0f".parse::<DocumentId>().unwrap_err();
        assert!(matches!(err, DbError::InvalidId(ref id) if id == "6449b28d0efd053def76bf0f"));
    }

    #[test]
    fn apply_merges_fields_and_bumps_metadata() {
        let mut fields = Fields::new();
        fields.insert("title".into(), json!("Dune"));
        fields.insert("price".into(), json!(25));
        let mut document = Document::new(fields);
        let before = document.clone();

        let mut changes = Fields::new();
        changes.insert("price".into(), json!(30));
        document.apply(changes);

        assert_eq!(document.get("title"), Some(&json!("Dune")));
        assert_eq!(document.get("price"), Some(&json!(30)));
        assert_eq!(document.revision, 1);
        assert!(document.updated_at > before.updated_at);
        assert_eq!(document.created_at, before.created_at);
    }

    #[test]
    fn next_timestamp_is_strictly_increasing() {
        let future = OffsetDateTime::now_utc() + time::Duration::hours(1);
        assert!(next_timestamp(future) > future);
    }
}
