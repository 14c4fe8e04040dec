// src/storage/mod.rs

//! Storage abstractions for crawl output.
//!
//! ## Directory Structure
//!
//! ```text
//! {output_root}/
//! ├── lists/
//! │   ├── firms_list.json        # List manifest (detail stage input)
//! │   └── firms_list.csv
//! └── results/
//!     ├── all_firms.json         # Aggregate, rebuilt by consolidation
//!     ├── all_firms.csv
//!     └── firms/
//!         ├── acme_capital_ltd.json
//!         └── acme_capital_ltd.csv
//! ```

pub mod local;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;
use crate::models::{Category, PathsConfig};

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for output storage backends. Keys are `/`-separated relative paths.
#[async_trait]
pub trait RecordStorage: Send + Sync {
    /// Write bytes so readers never observe a partial file.
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Read bytes, returning None if the key doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Create a directory (and parents) if missing.
    async fn ensure_dir(&self, dir: &str) -> Result<()>;

    /// File names directly under `dir` ending in `.{extension}`, sorted.
    /// A missing directory lists as empty.
    async fn list_files(&self, dir: &str, extension: &str) -> Result<Vec<String>>;
}

/// Serialize a value as pretty JSON and write it.
pub async fn write_json<S, T>(storage: &S, key: &str, value: &T) -> Result<()>
where
    S: RecordStorage + ?Sized,
    T: Serialize + ?Sized,
{
    let bytes = serde_json::to_vec_pretty(value)?;
    storage.write_bytes(key, &bytes).await
}

/// Read and parse a JSON value, returning None if the key doesn't exist.
pub async fn read_json<S, T>(storage: &S, key: &str) -> Result<Option<T>>
where
    S: RecordStorage + ?Sized,
    T: DeserializeOwned,
{
    match storage.read_bytes(key).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Maps categories to storage keys.
#[derive(Debug, Clone)]
pub struct Layout {
    lists_dir: String,
    results_dir: String,
}

impl Layout {
    pub fn new(paths: &PathsConfig) -> Self {
        Self {
            lists_dir: trim_dir(&paths.lists_dir),
            results_dir: trim_dir(&paths.results_dir),
        }
    }

    /// `lists/<category>_list.json`
    pub fn list_manifest(&self, category: Category) -> String {
        join(&self.lists_dir, &format!("{category}_list.json"))
    }

    /// `lists/<category>_list.csv`
    pub fn list_csv(&self, category: Category) -> String {
        join(&self.lists_dir, &format!("{category}_list.csv"))
    }

    /// `results/<category>`, holding one JSON and one CSV per record.
    pub fn record_dir(&self, category: Category) -> String {
        join(&self.results_dir, category.as_str())
    }

    /// `results/<category>/<stem>.<extension>`
    pub fn record_file(&self, category: Category, stem: &str, extension: &str) -> String {
        join(&self.record_dir(category), &format!("{stem}.{extension}"))
    }

    /// `results/all_<category>.json`
    pub fn aggregate_json(&self, category: Category) -> String {
        join(&self.results_dir, &format!("all_{category}.json"))
    }

    /// `results/all_<category>.csv`
    pub fn aggregate_csv(&self, category: Category) -> String {
        join(&self.results_dir, &format!("all_{category}.csv"))
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(&PathsConfig::default())
    }
}

fn trim_dir(dir: &str) -> String {
    dir.trim_matches('/').to_string()
}

fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() || dir == "." {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_keys() {
        let layout = Layout::default();
        assert_eq!(layout.list_manifest(Category::Firms), "lists/firms_list.json");
        assert_eq!(
            layout.record_file(Category::PassportedFunds, "alpha", "csv"),
            "results/passported_funds/alpha.csv"
        );
        assert_eq!(layout.aggregate_json(Category::Funds), "results/all_funds.json");
    }

    #[test]
    fn test_aggregates_live_outside_record_dir() {
        let layout = Layout::default();
        let dir = layout.record_dir(Category::Firms);
        assert!(!layout.aggregate_json(Category::Firms).starts_with(&dir));
    }

    #[test]
    fn test_layout_trims_slashes() {
        let layout = Layout::new(&PathsConfig {
            output_root: ".".into(),
            lists_dir: "out/lists/".into(),
            results_dir: ".".into(),
        });
        assert_eq!(layout.list_csv(Category::Individuals), "out/lists/individuals_list.csv");
        assert_eq!(layout.aggregate_csv(Category::Individuals), "all_individuals.csv");
    }
}
