// src/pipeline/resume.rs

//! Resuming a detail stage from files already on disk.
//!
//! The number of persisted `*.json` files in a category directory is taken as
//! the number of manifest entries already processed, and work resumes at that
//! offset. This relies on the manifest keeping the same order between runs.

use crate::error::Result;
use crate::storage::RecordStorage;

/// Extension marking a persisted record.
pub const RECORD_EXTENSION: &str = "json";

/// Where a detail stage picks up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePoint {
    /// Entries in the manifest
    pub total: usize,
    /// Records already persisted
    pub completed: usize,
}

impl ResumePoint {
    /// Count persisted records under `dir`.
    pub async fn detect<S>(storage: &S, dir: &str, total: usize) -> Result<Self>
    where
        S: RecordStorage + ?Sized,
    {
        let completed = storage.list_files(dir, RECORD_EXTENSION).await?.len();
        Ok(Self { total, completed })
    }

    /// Manifest suffix still to process.
    pub fn remaining<'a, T>(&self, manifest: &'a [T]) -> &'a [T] {
        &manifest[self.completed.min(manifest.len())..]
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_counts_only_record_files() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        for key in ["firms/a.json", "firms/a.csv", "firms/b.json", "all_firms.json"] {
            storage.write_bytes(key, b"{}").await.unwrap();
        }

        let point = ResumePoint::detect(&storage, "firms", 5).await.unwrap();
        assert_eq!(point.completed, 2);
        assert!(!point.is_complete());
    }

    #[tokio::test]
    async fn test_missing_dir_starts_from_zero() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let point = ResumePoint::detect(&storage, "nothing", 3).await.unwrap();
        assert_eq!(point.completed, 0);
        assert_eq!(point.remaining(&[1, 2, 3]), &[1, 2, 3]);
    }

    #[test]
    fn test_remaining_is_suffix() {
        let manifest = ["a", "b", "c", "d", "e"];
        let point = ResumePoint {
            total: 5,
            completed: 3,
        };
        assert_eq!(point.remaining(&manifest), &["d", "e"]);
    }

    #[test]
    fn test_over_count_leaves_nothing() {
        let point = ResumePoint {
            total: 2,
            completed: 4,
        };
        assert!(point.remaining(&[1, 2]).is_empty());
        assert!(point.is_complete());
    }
}
