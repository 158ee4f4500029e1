use thiserror::Error;

/// The common error type used by this crate
#[derive(Error, Debug)]
pub enum NestedSetStoreError {
    /// A record that an operation depends upon is not present in the store
    #[error("Record not found: {0}")]
    NotFound(String),

    /// An error that occurs when working with a storage backend
    #[error("Storage backend error: {0}")]
    StorageBackend(String),

    /// An error that occurs when (de)serializing records
    #[error("Failed to encode or decode records: {0}")]
    Encoding(String),
}

impl From<serde_json::Error> for NestedSetStoreError {
    fn from(value: serde_json::Error) -> Self {
        NestedSetStoreError::Encoding(format!("{value}"))
    }
}
