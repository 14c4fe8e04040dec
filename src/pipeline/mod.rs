// src/pipeline/mod.rs

//! Pipeline entry points for crawler operations.
//!
//! - `run_list`: Walk a category's list pages into a manifest
//! - `run_details`: Fetch detail pages for manifest entries not yet persisted
//! - `run_consolidate`: Merge persisted records into aggregate JSON/CSV
//! - `run_category`: All of the above, as the category supports

mod consolidate;
mod context;
mod dedupe;
mod details;
mod list;
mod paginate;
mod progress;
mod resume;
mod retry;
mod scheduler;

pub use consolidate::{ConsolidationSummary, Table, run_consolidate, schema};
pub use context::Context;
pub use dedupe::{dedupe, fingerprint};
pub use details::run_details;
pub use list::{ListReport, run_list};
pub use paginate::PageWalker;
pub use progress::Progress;
pub use resume::{RECORD_EXTENSION, ResumePoint};
pub use retry::RetryPolicy;
pub use scheduler::{DetailScheduler, ItemOutcome};

use serde::Serialize;

use crate::error::Result;
use crate::models::Category;

/// Reports from a full category run.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub list: ListReport,
    /// Absent for list-only categories
    pub details: Option<Progress>,
    pub consolidation: Option<ConsolidationSummary>,
}

/// Run the list stage, then details and consolidation when the category has
/// detail pages.
pub async fn run_category(ctx: &Context<'_>, category: Category) -> Result<CategoryReport> {
    let list = run_list(ctx, category).await?;

    if !ctx.config.profile(category)?.has_details() {
        log::info!("{} is list only; skipping details", category.label());
        return Ok(CategoryReport {
            list,
            details: None,
            consolidation: None,
        });
    }

    let details = run_details(ctx, category).await?;
    let consolidation = run_consolidate(ctx, category).await?;

    Ok(CategoryReport {
        list,
        details: Some(details),
        consolidation: Some(consolidation),
    })
}
