// src/services/mod.rs

//! Collaborators the pipeline drives: fetching raw pages and reading records
//! out of them.

mod extract;
mod fetcher;

pub use extract::Extractor;
pub use fetcher::{Endpoint, HttpFetcher, PageFetcher};
