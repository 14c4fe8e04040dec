// src/storage/local.rs

//! Local filesystem storage implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::RecordStorage;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_parent(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStorage for LocalStorage {
    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_parent(&path).await?;

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn ensure_dir(&self, dir: &str) -> Result<()> {
        tokio::fs::create_dir_all(self.path(dir)).await?;
        Ok(())
    }

    async fn list_files(&self, dir: &str, extension: &str) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(self.path(dir)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(extension) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{read_json, write_json};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.write_bytes("a/b/test.txt", b"hello").await.unwrap();
        let data = storage.read_bytes("a/b/test.txt").await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
        assert!(!tmp.path().join("a/b/test.txt.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let data = storage.read_bytes("nope.txt").await.unwrap();
        assert!(data.is_none());
    }

    #[tokio::test]
    async fn test_json_round_trip() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        write_json(&storage, "lists/x.json", &vec!["a", "b"]).await.unwrap();
        let loaded: Vec<String> = read_json(&storage, "lists/x.json").await.unwrap().unwrap();
        assert_eq!(loaded, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_list_files_filters_and_sorts() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        for key in ["d/b.json", "d/a.json", "d/a.csv", "d/sub/c.json"] {
            storage.write_bytes(key, b"{}").await.unwrap();
        }

        let names = storage.list_files("d", "json").await.unwrap();
        assert_eq!(names, vec!["a.json", "b.json"]);
        assert!(storage.list_files("missing", "json").await.unwrap().is_empty());
    }
}
