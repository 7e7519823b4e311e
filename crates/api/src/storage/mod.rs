//! Object storage for applicant documents.
//!
//! Handlers only see the [`ObjectStorage`] trait; [`local::LocalStorage`]
//! is the filesystem-backed implementation used in development and tests.

pub mod local;

use async_trait::async_trait;

pub use local::LocalStorage;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The key would resolve outside the storage root.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Write `bytes` under `key`, replacing any existing object.
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> StorageResult<()>;

    /// Remove the object under `key`. Deleting a missing object succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;
}

/// Delete objects whose database rows are gone, logging failures.
///
/// Never fails: an orphaned object is preferable to failing a request whose
/// database work already committed.
pub async fn delete_best_effort(storage: &dyn ObjectStorage, keys: &[String]) {
    for key in keys {
        if let Err(e) = storage.delete(key).await {
            tracing::warn!(storage_key = %key, error = %e, "Failed to delete stored object");
        }
    }
}
