// src/services/fetcher.rs

//! Page fetching.
//!
//! A fetcher makes exactly one request per call. Retrying belongs to the
//! pipeline, so a failed call simply returns the error.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{CategoryProfile, CrawlerConfig};
use crate::utils::http::{create_async_client, header_map};

/// What to fetch for a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// One page of the list endpoint, with extra filter parameters
    List {
        page: u32,
        filters: BTreeMap<String, String>,
    },
    /// An absolute detail-page URL
    Detail { url: String },
}

impl Endpoint {
    pub fn list(page: u32, filters: &BTreeMap<String, String>) -> Self {
        Self::List {
            page,
            filters: filters.clone(),
        }
    }

    pub fn detail(url: impl Into<String>) -> Self {
        Self::Detail { url: url.into() }
    }
}

/// Source of raw HTML documents.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, profile: &CategoryProfile, endpoint: &Endpoint) -> Result<String>;
}

/// `PageFetcher` backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
    list_headers: HeaderMap,
}

impl HttpFetcher {
    /// Create a fetcher from crawler settings.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            base_url: Url::parse(&config.base_url)?,
            list_headers: header_map(&config.list_headers)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the URL of one list page: `page` first, then the profile's
    /// fixed parameters with `filters` taking precedence.
    pub fn list_url(
        &self,
        profile: &CategoryProfile,
        page: u32,
        filters: &BTreeMap<String, String>,
    ) -> Result<Url> {
        let mut url = self.base_url.join(&profile.list_path)?;

        let mut params = profile.list_params.clone();
        params.extend(filters.iter().map(|(k, v)| (k.clone(), v.clone())));

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page", &page.to_string());
            for (key, value) in &params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, profile: &CategoryProfile, endpoint: &Endpoint) -> Result<String> {
        let request = match endpoint {
            Endpoint::List { page, filters } => {
                let url = self.list_url(profile, *page, filters)?;
                self.client.get(url).headers(self.list_headers.clone())
            }
            Endpoint::Detail { url } => self.client.get(Url::parse(url)?),
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch {
                url: response.url().to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}
