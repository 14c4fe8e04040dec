// src/pipeline/scheduler.rs

//! Batched detail fetching with per-item retry.
//!
//! Items are processed in fixed-size batches. Every fetch in a batch runs
//! concurrently and the whole batch settles before the next one starts. An
//! item that keeps failing is dropped and the run carries on; only a storage
//! failure stops it.

use futures::stream::{self, StreamExt};
use serde_json::Value;

use super::consolidate::Table;
use super::{Context, Progress};
use crate::error::Result;
use crate::models::{CategoryProfile, DetailRecord, ListRecord, URL_FIELD};
use crate::services::{Endpoint, Extractor};
use crate::storage::write_json;
use crate::utils::{resolve_url, sanitize_name};

/// What happened to one work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Persisted under this file stem
    Persisted(String),
    /// Skipped, with the reason
    Dropped(String),
}

/// Fetches, combines and persists the detail pages of one category.
pub struct DetailScheduler<'c, 'a> {
    ctx: &'c Context<'a>,
    profile: &'c CategoryProfile,
    extractor: &'c Extractor,
}

impl<'c, 'a> DetailScheduler<'c, 'a> {
    pub fn new(ctx: &'c Context<'a>, profile: &'c CategoryProfile, extractor: &'c Extractor) -> Self {
        Self {
            ctx,
            profile,
            extractor,
        }
    }

    /// Process `work` batch by batch, updating `progress` as items settle.
    pub async fn run(&self, work: &[ListRecord], progress: &mut Progress) -> Result<()> {
        let batch_size = self.profile.detail_batch_size.max(1);
        let batch_count = work.len().div_ceil(batch_size);
        let category = self.profile.category;

        for (index, batch) in work.chunks(batch_size).enumerate() {
            if index > 0 && !self.ctx.batch_delay().is_zero() {
                tokio::time::sleep(self.ctx.batch_delay()).await;
            }
            log::info!(
                "{} batch {}/{} ({} items)",
                category.label(),
                index + 1,
                batch_count,
                batch.len()
            );

            let mut settled = stream::iter(batch)
                .map(|record| self.process(record))
                .buffer_unordered(batch.len());

            while let Some(outcome) = settled.next().await {
                match outcome? {
                    ItemOutcome::Persisted(stem) => {
                        progress.record_success();
                        log::info!("Saved {stem} | Progress: {}", progress.status_line());
                    }
                    ItemOutcome::Dropped(reason) => {
                        progress.record_failure();
                        log::error!("Dropped record: {reason}");
                    }
                }
            }

            log::info!(
                "Remaining: {} {} ({:.2}%)",
                progress.remaining(),
                category.as_str(),
                100.0 - progress.percent()
            );
        }

        Ok(())
    }

    /// Fetch one detail page and persist the combined record.
    ///
    /// Fetch failures become `Dropped`; storage failures are returned.
    pub async fn process(&self, record: &ListRecord) -> Result<ItemOutcome> {
        let Some(url) = self.detail_url(record) else {
            return Ok(ItemOutcome::Dropped(format!(
                "'{}' has no detail link",
                record.name()
            )));
        };

        let label = if record.name().is_empty() {
            url.clone()
        } else {
            record.name().to_string()
        };
        let endpoint = Endpoint::detail(url.clone());
        let context = format!("{} detail '{label}'", self.profile.category);

        log::debug!("Fetching {url}");
        let fetched = self
            .ctx
            .retry
            .run(&context, |_| self.ctx.fetcher.fetch(self.profile, &endpoint))
            .await;

        let html = match fetched {
            Ok(html) => html,
            Err(error) => return Ok(ItemOutcome::Dropped(error.to_string())),
        };

        let detail = self.extractor.extract_detail(&html);
        let combined = DetailRecord::new(self.profile.category, url.as_str(), record.clone(), detail);
        let stem = sanitize_name(record.name(), Some(&url));
        self.persist(&stem, &combined.to_value()).await?;

        Ok(ItemOutcome::Persisted(stem))
    }

    /// Absolute detail URL: the manifest's `url`, else the row link resolved
    /// against the base URL.
    fn detail_url(&self, record: &ListRecord) -> Option<String> {
        if let Some(url) = record.get(URL_FIELD).filter(|u| !u.trim().is_empty()) {
            return Some(url.to_string());
        }
        record
            .link()
            .map(|link| resolve_url(self.ctx.base_url(), link))
    }

    /// Write the CSV first so the JSON, which marks the record as done, only
    /// appears once both files exist.
    async fn persist(&self, stem: &str, value: &Value) -> Result<()> {
        let layout = &self.ctx.layout;
        let category = self.profile.category;

        let table = Table::from_values(std::slice::from_ref(value), &self.ctx.config.export.placeholder);
        let csv_key = layout.record_file(category, stem, "csv");
        self.ctx.storage.write_bytes(&csv_key, &table.to_csv()?).await?;

        let json_key = layout.record_file(category, stem, super::resume::RECORD_EXTENSION);
        write_json(self.ctx.storage, &json_key, value).await
    }
}
