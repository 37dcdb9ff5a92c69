use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

/// Failures raised by a document store.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("unsupported database endpoint '{0}'; expected memory:// or file://<path>")]
    InvalidEndpoint(String),

    #[error("'{0}' is not a valid document id")]
    InvalidId(String),

    #[error("document store I/O failed")]
    Io(#[from] std::io::Error),

    #[error("document snapshot is unreadable")]
    Snapshot(#[from] serde_json::Error),
}
