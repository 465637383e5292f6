/// Movie Links - search-to-download-link resolver
///
/// Searches a movie catalog, selects the best-quality download entry of each
/// title, follows it through an intermediate page and collects every provider
/// link on the final landing page.

pub mod api;
pub mod config;
pub mod error;
pub mod links;
pub mod pipeline;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{LinkError, Result};
pub use crate::links::{
    HttpFetcher, LinkScraper, PageFetcher, ProviderLink, QualityGroups, QualitySelection,
    ResolvedPage, SearchResult,
};
pub use crate::pipeline::{BatchResult, LinkPipeline, QualityLinks, ResolvedMovie};
