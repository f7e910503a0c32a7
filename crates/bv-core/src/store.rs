//! Storage surface the verifier reads artifacts from.
//!
//! The engine only ever needs list/stat/read/write/remove on a
//! filesystem-like store, so that surface is a trait; production uses
//! the local filesystem, tests substitute an in-memory store.

use crate::CoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncRead;

/// Metadata for a single store entry
#[derive(Debug, Clone)]
pub struct EntryStat {
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
    pub is_dir: bool,
}

/// Filesystem-like artifact store
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// List entry paths directly under a directory
    async fn list_dir(&self, dir: &Path) -> CoreResult<Vec<PathBuf>>;

    /// Stat a single entry
    async fn stat(&self, path: &Path) -> CoreResult<EntryStat>;

    /// Read an entry's full contents
    async fn read(&self, path: &Path) -> CoreResult<Vec<u8>>;

    /// Open an entry for streamed reading
    async fn open_reader(&self, path: &Path) -> CoreResult<Box<dyn AsyncRead + Send + Unpin>>;

    /// Write full contents to an entry
    async fn write(&self, path: &Path, data: &[u8]) -> CoreResult<()>;

    /// Create a directory and its ancestors; succeeds if it already exists
    async fn create_dir_all(&self, dir: &Path) -> CoreResult<()>;

    /// Delete a file
    async fn remove_file(&self, path: &Path) -> CoreResult<()>;
}

/// Local filesystem store
#[derive(Debug, Default)]
pub struct LocalArtifactStore;

impl LocalArtifactStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn list_dir(&self, dir: &Path) -> CoreResult<Vec<PathBuf>> {
        let mut entries = fs::read_dir(dir).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            paths.push(entry.path());
        }
        Ok(paths)
    }

    async fn stat(&self, path: &Path) -> CoreResult<EntryStat> {
        let metadata = fs::metadata(path).await?;
        let modified_at = DateTime::<Utc>::from(metadata.modified()?);
        Ok(EntryStat {
            size_bytes: metadata.len(),
            modified_at,
            is_dir: metadata.is_dir(),
        })
    }

    async fn read(&self, path: &Path) -> CoreResult<Vec<u8>> {
        Ok(fs::read(path).await?)
    }

    async fn open_reader(&self, path: &Path) -> CoreResult<Box<dyn AsyncRead + Send + Unpin>> {
        let file = fs::File::open(path).await?;
        Ok(Box::new(file))
    }

    async fn write(&self, path: &Path, data: &[u8]) -> CoreResult<()> {
        Ok(fs::write(path, data).await?)
    }

    async fn create_dir_all(&self, dir: &Path) -> CoreResult<()> {
        Ok(fs::create_dir_all(dir).await?)
    }

    async fn remove_file(&self, path: &Path) -> CoreResult<()> {
        Ok(fs::remove_file(path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new();
        let path = dir.path().join("sample.db");

        store.write(&path, b"hello backup").await.unwrap();
        let stat = store.stat(&path).await.unwrap();
        assert_eq!(stat.size_bytes, 12);
        assert!(!stat.is_dir);

        let data = store.read(&path).await.unwrap();
        assert_eq!(data, b"hello backup");

        let listed = store.list_dir(dir.path()).await.unwrap();
        assert_eq!(listed, vec![path.clone()]);

        store.remove_file(&path).await.unwrap();
        assert!(store.stat(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_create_dir_all_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new();
        let nested = dir.path().join("a/b/c");

        store.create_dir_all(&nested).await.unwrap();
        store.create_dir_all(&nested).await.unwrap();
        assert!(store.stat(&nested).await.unwrap().is_dir);
    }
}
