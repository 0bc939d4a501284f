use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The collection file exists but could not be read or parsed.
    #[error("Failed to read collection '{collection}': {source}")]
    StorageRead {
        collection: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The collection could not be written back to disk.
    #[error("Failed to write collection '{collection}': {source}")]
    StorageWrite {
        collection: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Collection '{collection}' was modified by another writer")]
    ConcurrentModification { collection: String },

    #[error("Timed out after {waited:?} waiting for collection '{collection}'")]
    StorageTimeout { collection: String, waited: Duration },

    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl StoreError {
    pub fn read(
        collection: &str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        StoreError::StorageRead {
            collection: collection.to_string(),
            source: source.into(),
        }
    }

    pub fn write(
        collection: &str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        StoreError::StorageWrite {
            collection: collection.to_string(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
