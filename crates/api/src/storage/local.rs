//! Filesystem-backed [`ObjectStorage`].

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use super::{ObjectStorage, StorageError, StorageResult};

/// Stores each object as a file under `root`, keyed by relative path.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key onto a path under the root, rejecting traversal.
    fn resolve(&self, key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> StorageResult<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(storage_key = %key, content_type, size = bytes.len(), "Stored object");
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn put_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage
            .put("applicants/1/a.pdf", b"%PDF-1.4", "application/pdf")
            .await
            .unwrap();
        assert_eq!(
            std::fs::read(dir.path().join("applicants/1/a.pdf")).unwrap(),
            b"%PDF-1.4"
        );

        storage.delete("applicants/1/a.pdf").await.unwrap();
        assert!(!dir.path().join("applicants/1/a.pdf").exists());
        // Deleting again is fine.
        storage.delete("applicants/1/a.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        assert_matches!(
            storage.put("../escape.pdf", b"x", "application/pdf").await,
            Err(StorageError::InvalidKey(_))
        );
        assert_matches!(
            storage.delete("/etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        );
        assert_matches!(storage.delete("").await, Err(StorageError::InvalidKey(_)));
    }
}
