// src/pipeline/context.rs

//! Shared state handed to every stage.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use super::RetryPolicy;
use crate::error::Result;
use crate::models::Config;
use crate::services::PageFetcher;
use crate::storage::{Layout, RecordStorage};

/// Configuration and collaborators for one crawl.
pub struct Context<'a> {
    pub config: &'a Config,
    pub fetcher: &'a dyn PageFetcher,
    pub storage: &'a dyn RecordStorage,
    pub layout: Layout,
    pub retry: RetryPolicy,
    base_url: Url,
}

impl<'a> Context<'a> {
    pub fn new(
        config: &'a Config,
        fetcher: &'a dyn PageFetcher,
        storage: &'a dyn RecordStorage,
    ) -> Result<Self> {
        Ok(Self {
            config,
            fetcher,
            storage,
            layout: Layout::new(&config.paths),
            retry: RetryPolicy::from_config(&config.retry),
            base_url: Url::parse(&config.crawler.base_url)?,
        })
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Pause between sequential list pages.
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.config.crawler.request_delay_ms)
    }

    /// Pause between batches.
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.config.crawler.batch_delay_ms)
    }

    /// Display path of a storage key under the output root.
    pub fn display_path(&self, key: &str) -> PathBuf {
        PathBuf::from(&self.config.paths.output_root).join(key)
    }
}
