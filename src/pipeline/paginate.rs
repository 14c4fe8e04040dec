// src/pipeline/paginate.rs

//! Walking a paginated list endpoint until it runs out.
//!
//! A walk ends at the first empty page, at the configured page ceiling, or at
//! the first error, which is returned rather than treated as the end of data.
//! Records come back in page order.

use std::future::Future;
use std::time::Duration;

use futures::stream::{FuturesOrdered, StreamExt};

use crate::error::Result;
use crate::models::{PageStrategy, Pagination};

/// Drives page fetches for one list endpoint.
#[derive(Debug, Clone)]
pub struct PageWalker {
    strategy: PageStrategy,
    start_page: u32,
    max_pages: Option<u32>,
    delay: Duration,
}

impl PageWalker {
    /// Walker starting at page 1.
    pub fn new(strategy: PageStrategy, max_pages: Option<u32>, delay: Duration) -> Self {
        Self {
            strategy,
            start_page: 1,
            max_pages,
            delay,
        }
    }

    /// Walker for a profile's pagination; `delay` separates sequential pages
    /// and page batches.
    pub fn from_pagination(pagination: &Pagination, delay: Duration) -> Self {
        Self::new(pagination.strategy, pagination.max_pages, delay)
            .starting_at(pagination.start_page)
    }

    pub fn starting_at(mut self, page: u32) -> Self {
        self.start_page = page;
        self
    }

    /// Fetch pages from the start page onwards and accumulate their records.
    ///
    /// `fetch_page` receives the page number. `max_pages` counts pages from
    /// the start page.
    pub async fn walk<T, F, Fut>(&self, fetch_page: F) -> Result<Vec<T>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        match self.strategy {
            PageStrategy::Sequential => self.walk_sequential(fetch_page).await,
            PageStrategy::Batched { size } => self.walk_batched(size.max(1), fetch_page).await,
        }
    }

    fn within_limit(&self, page: u32) -> bool {
        self.max_pages
            .is_none_or(|max| page.saturating_sub(self.start_page) < max)
    }

    /// Last page the ceiling allows, if any.
    fn last_allowed(&self) -> Option<u32> {
        self.max_pages
            .map(|max| self.start_page.saturating_add(max.saturating_sub(1)))
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    async fn walk_sequential<T, F, Fut>(&self, mut fetch_page: F) -> Result<Vec<T>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        let mut records = Vec::new();
        let mut page = self.start_page;

        while self.within_limit(page) {
            if page > self.start_page {
                self.pause().await;
            }

            let batch = fetch_page(page).await?;
            if batch.is_empty() {
                log::debug!("Page {page} is empty; end of list");
                break;
            }

            log::info!("Page {page}: {} records", batch.len());
            records.extend(batch);
            page = match page.checked_add(1) {
                Some(next) => next,
                None => break,
            };
        }

        Ok(records)
    }

    /// Pages of a batch are requested together and consumed in page order.
    /// The walk returns as soon as the first empty page (or error) comes up
    /// in that order, dropping later pages of the batch that are still in
    /// flight.
    async fn walk_batched<T, F, Fut>(&self, size: usize, mut fetch_page: F) -> Result<Vec<T>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        let size = u32::try_from(size).unwrap_or(u32::MAX);
        let mut records = Vec::new();
        let mut first = self.start_page;

        while self.within_limit(first) {
            if first > self.start_page {
                self.pause().await;
            }

            let mut last = first.saturating_add(size - 1);
            if let Some(max) = self.last_allowed() {
                last = last.min(max);
            }

            log::info!("Fetching pages {first}..={last}");
            let mut in_flight: FuturesOrdered<_> = (first..=last)
                .map(|page| {
                    let fetched = fetch_page(page);
                    async move { (page, fetched.await) }
                })
                .collect();

            while let Some((page, result)) = in_flight.next().await {
                let batch = result?;
                if batch.is_empty() {
                    log::debug!("Page {page} is empty; end of list");
                    return Ok(records);
                }
                log::info!("Page {page}: {} records", batch.len());
                records.extend(batch);
            }

            first = match last.checked_add(1) {
                Some(next) => next,
                None => break,
            };
        }

        Ok(records)
    }
}
