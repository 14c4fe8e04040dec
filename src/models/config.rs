// src/models/config.rs

//! Application configuration structures.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use super::{Category, CategoryProfile};
use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Retry policy for page fetches
    #[serde(default)]
    pub retry: RetryConfig,

    /// Output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Tabular export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// One profile per register category
    #[serde(default = "CategoryProfile::defaults")]
    pub categories: Vec<CategoryProfile>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Profile configured for a category.
    pub fn profile(&self, category: Category) -> Result<&CategoryProfile> {
        self.categories
            .iter()
            .find(|p| p.category == category)
            .ok_or_else(|| AppError::config(format!("no profile configured for '{category}'")))
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.base_url.trim().is_empty() {
            return Err(AppError::validation("crawler.base_url is empty"));
        }
        url::Url::parse(&self.crawler.base_url)?;
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.categories.is_empty() {
            return Err(AppError::validation("No categories defined"));
        }

        let mut seen = HashSet::new();
        for profile in &self.categories {
            let key = profile.category.as_str();
            if !seen.insert(profile.category) {
                return Err(AppError::validation(format!(
                    "category '{key}' is defined more than once"
                )));
            }
            if profile.detail_batch_size == 0 {
                return Err(AppError::validation(format!(
                    "{key}.detail_batch_size must be > 0"
                )));
            }
            if let super::PageStrategy::Batched { size: 0 } = profile.pagination.strategy {
                return Err(AppError::validation(format!(
                    "{key}.pagination.size must be > 0"
                )));
            }
            if profile.pagination.max_pages == Some(0) {
                return Err(AppError::validation(format!(
                    "{key}.pagination.max_pages must be > 0"
                )));
            }
            for selector in profile.selectors() {
                Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            retry: RetryConfig::default(),
            paths: PathsConfig::default(),
            export: ExportConfig::default(),
            categories: CategoryProfile::defaults(),
        }
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Origin every list path and relative link is resolved against
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between sequential list pages in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Delay between page or detail batches in milliseconds
    #[serde(default = "defaults::batch_delay")]
    pub batch_delay_ms: u64,

    /// Static headers replayed on every request
    #[serde(default = "defaults::headers")]
    pub headers: BTreeMap<String, String>,

    /// Extra headers for list (XHR) requests
    #[serde(default = "defaults::list_headers")]
    pub list_headers: BTreeMap<String, String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            batch_delay_ms: defaults::batch_delay(),
            headers: defaults::headers(),
            list_headers: defaults::list_headers(),
        }
    }
}

/// Retry-with-backoff settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Backoff base; attempt `n` waits `base * 2^(n-1)`
    #[serde(default = "defaults::base_delay")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: defaults::max_retries(),
            base_delay_ms: defaults::base_delay(),
        }
    }
}

/// Output directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::output_root")]
    pub output_root: String,

    /// List manifests, relative to the output root
    #[serde(default = "defaults::lists_dir")]
    pub lists_dir: String,

    /// Per-record files and aggregates, relative to the output root
    #[serde(default = "defaults::results_dir")]
    pub results_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_root: defaults::output_root(),
            lists_dir: defaults::lists_dir(),
            results_dir: defaults::results_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Cell value written for fields a record does not have
    #[serde(default = "defaults::placeholder")]
    pub placeholder: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            placeholder: defaults::placeholder(),
        }
    }
}

mod defaults {
    use std::collections::BTreeMap;

    // Crawler defaults
    pub fn base_url() -> String {
        "https://www.dfsa.ae".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/129.0.0.0 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        1000
    }
    pub fn batch_delay() -> u64 {
        1000
    }
    pub fn headers() -> BTreeMap<String, String> {
        BTreeMap::from([("accept".into(), "text/html, */*; q=0.01".into())])
    }
    pub fn list_headers() -> BTreeMap<String, String> {
        BTreeMap::from([("x-requested-with".into(), "XMLHttpRequest".into())])
    }

    // Retry defaults
    pub fn max_retries() -> u32 {
        2
    }
    pub fn base_delay() -> u64 {
        2000
    }

    // Path defaults
    pub fn output_root() -> String {
        ".".into()
    }
    pub fn lists_dir() -> String {
        "lists".into()
    }
    pub fn results_dir() -> String {
        "results".into()
    }

    // Export defaults
    pub fn placeholder() -> String {
        "N/A".into()
    }
}
