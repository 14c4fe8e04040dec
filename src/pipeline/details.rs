// src/pipeline/details.rs

//! Detail stage: fetch the detail page of every manifest entry not yet on disk.

use super::{Context, DetailScheduler, Progress, ResumePoint};
use crate::error::{AppError, Result};
use crate::models::{Category, ListRecord};
use crate::services::Extractor;
use crate::storage::read_json;

/// Fetch and persist detail records for `category`, resuming after whatever
/// is already persisted.
///
/// Fails with `ManifestMissing` before touching the output directory when the
/// list stage has not run.
pub async fn run_details(ctx: &Context<'_>, category: Category) -> Result<Progress> {
    let profile = ctx.config.profile(category)?;
    if !profile.has_details() {
        return Err(AppError::config(format!(
            "{} has no detail pages; run the list stage only",
            category.label()
        )));
    }
    let extractor = Extractor::new(profile)?;

    let manifest_key = ctx.layout.list_manifest(category);
    let manifest: Vec<ListRecord> = read_json(ctx.storage, &manifest_key)
        .await?
        .ok_or_else(|| AppError::ManifestMissing {
            path: ctx.display_path(&manifest_key),
        })?;
    log::info!("Found {} {} in the list manifest", manifest.len(), category.as_str());

    let dir = ctx.layout.record_dir(category);
    ctx.storage.ensure_dir(&dir).await?;

    let resume = ResumePoint::detect(ctx.storage, &dir, manifest.len()).await?;
    let work = resume.remaining(&manifest);
    if resume.completed > 0 {
        log::info!(
            "Found {} existing {} records; resuming from entry {}",
            resume.completed,
            category.as_str(),
            resume.completed + 1
        );
    }

    let mut progress = Progress::new(category, manifest.len(), resume.completed.min(manifest.len()));
    if work.is_empty() {
        log::info!("All {} details already persisted", category.as_str());
    } else {
        DetailScheduler::new(ctx, profile, &extractor)
            .run(work, &mut progress)
            .await?;
    }
    progress.finish();

    log::info!(
        "{} details: {} persisted this run, {} dropped, {}",
        category.label(),
        progress.persisted_this_run(),
        progress.failed,
        progress.status_line()
    );
    Ok(progress)
}
