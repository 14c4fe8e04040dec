// src/pipeline/list.rs

//! List stage: walk every list page of a category and write the manifest.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::consolidate::Table;
use super::{Context, PageWalker, dedupe};
use crate::error::Result;
use crate::models::{Category, CategoryProfile, ListRecord, PageStrategy, URL_FIELD};
use crate::services::{Endpoint, Extractor};
use crate::storage::write_json;
use crate::utils::resolve_url;

/// Outcome of a list stage.
#[derive(Debug, Clone, Serialize)]
pub struct ListReport {
    pub category: Category,
    /// Filter sets walked
    pub partitions: usize,
    /// Rows scraped before deduplication
    pub scraped: usize,
    /// Rows written to the manifest
    pub unique: usize,
    pub manifest_key: String,
    pub csv_key: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Crawl the list pages of `category` and persist them as JSON and CSV.
///
/// With several partitions the manifest is rewritten after each one, so a
/// partition that fails leaves the rows of the earlier ones on disk.
pub async fn run_list(ctx: &Context<'_>, category: Category) -> Result<ListReport> {
    let started_at = Utc::now();
    let profile = ctx.config.profile(category)?;
    let extractor = Extractor::new(profile)?;

    log::info!("Starting {} list crawl", category.label());

    let partitions = match profile.pagination.partitions.as_slice() {
        [] => vec![BTreeMap::new()],
        sets => sets.to_vec(),
    };

    let mut scraped = Vec::new();
    let mut unique = Vec::new();
    for (index, filters) in partitions.iter().enumerate() {
        if partitions.len() > 1 {
            log::info!(
                "Partition {}/{}: {}",
                index + 1,
                partitions.len(),
                describe(filters)
            );
        }
        let records = walk_partition(ctx, profile, &extractor, filters).await?;
        scraped.extend(records);

        unique = dedupe(scraped.clone());
        save_list(ctx, category, &mut unique).await?;
        log::info!(
            "{} records so far ({} unique)",
            scraped.len(),
            unique.len()
        );
    }

    let manifest_key = ctx.layout.list_manifest(category);
    let csv_key = ctx.layout.list_csv(category);

    log::info!(
        "Saved {} {} to {}",
        unique.len(),
        category.as_str(),
        ctx.display_path(&manifest_key).display()
    );

    Ok(ListReport {
        category,
        partitions: partitions.len(),
        scraped: scraped.len(),
        unique: unique.len(),
        manifest_key,
        csv_key,
        started_at,
        finished_at: Utc::now(),
    })
}

/// Add absolute detail URLs to `unique` and write the manifest and its CSV.
async fn save_list(ctx: &Context<'_>, category: Category, unique: &mut [ListRecord]) -> Result<()> {
    for record in unique.iter_mut() {
        if let Some(link) = record.link() {
            let url = resolve_url(ctx.base_url(), link);
            record.insert(URL_FIELD, url);
        }
    }

    write_json(ctx.storage, &ctx.layout.list_manifest(category), &*unique).await?;

    let values = unique
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<Value>, _>>()?;
    let table = Table::from_values(&values, &ctx.config.export.placeholder);
    ctx.storage
        .write_bytes(&ctx.layout.list_csv(category), &table.to_csv()?)
        .await
}

/// Walk one filter set to exhaustion, retrying each page.
async fn walk_partition(
    ctx: &Context<'_>,
    profile: &CategoryProfile,
    extractor: &Extractor,
    filters: &BTreeMap<String, String>,
) -> Result<Vec<ListRecord>> {
    let delay = match profile.pagination.strategy {
        PageStrategy::Sequential => ctx.request_delay(),
        PageStrategy::Batched { .. } => ctx.batch_delay(),
    };
    let walker = PageWalker::from_pagination(&profile.pagination, delay);

    walker
        .walk(move |page| {
            let endpoint = Endpoint::list(page, filters);
            let context = format!("{} list page {page}", profile.category);
            async move {
                let html = ctx
                    .retry
                    .run(&context, |_| ctx.fetcher.fetch(profile, &endpoint))
                    .await?;
                Ok(extractor.extract_list(&html))
            }
        })
        .await
}

fn describe(filters: &BTreeMap<String, String>) -> String {
    filters
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}
