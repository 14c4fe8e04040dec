// src/models/mod.rs

//! Domain models for the register crawler.

mod category;
mod config;
mod profile;
mod record;

// Re-export all public types
pub use category::Category;
pub use config::{Config, CrawlerConfig, ExportConfig, PathsConfig, RetryConfig};
pub use profile::{
    CategoryProfile, CollectionSpec, DetailProfile, FieldSpec, LabelledGroup, PageStrategy,
    Pagination, Pick, ValueList,
};
pub use record::{DetailPayload, DetailRecord, LINK_FIELD, ListRecord, NAME_FIELD, URL_FIELD};
