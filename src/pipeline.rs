use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::links::{HttpFetcher, LinkScraper, PageFetcher, QualityGroups, SearchResult};

/// Download links for one quality
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityLinks {
    pub quality: String,
    pub links: Vec<String>,
}

/// A fully resolved catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedMovie {
    pub title: String,
    pub year: String,
    #[serde(rename = "type")]
    pub media_type: String,
    #[serde(rename = "poster")]
    pub poster_url: String,
    #[serde(rename = "downloadLink")]
    pub download_links: Vec<QualityLinks>,
}

impl ResolvedMovie {
    pub fn new(candidate: &SearchResult, groups: QualityGroups) -> Self {
        Self {
            title: candidate.title.clone(),
            year: candidate.year.clone(),
            media_type: candidate.media_type.clone(),
            poster_url: candidate.thumbnail_url.clone(),
            download_links: groups
                .into_iter()
                .map(|group| QualityLinks {
                    quality: group.quality,
                    links: group.links.into_iter().map(|link| link.url).collect(),
                })
                .collect(),
        }
    }
}

/// Combined search output. Candidates that failed a later stage are absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchResult {
    pub ok: bool,
    pub results: Vec<ResolvedMovie>,
}

/// Drives search, resolution and extraction for every search result
#[derive(Clone)]
pub struct LinkPipeline {
    scraper: LinkScraper,
    max_concurrent: usize,
}

impl LinkPipeline {
    pub fn new(scraper: LinkScraper, max_concurrent: usize) -> Self {
        Self {
            scraper,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Build a pipeline over the live sites described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&config.http)?);
        Self::with_fetcher(fetcher, config)
    }

    pub fn with_fetcher(fetcher: Arc<dyn PageFetcher>, config: &Config) -> Result<Self> {
        let scraper = LinkScraper::new(fetcher, &config.sites)?;
        Ok(Self::new(scraper, config.http.max_concurrent_candidates))
    }

    pub fn scraper(&self) -> &LinkScraper {
        &self.scraper
    }

    /// Search for `query` and resolve the download links of every result.
    ///
    /// A failed search aborts the call. A candidate failing resolution or
    /// extraction is logged and skipped. Results keep search order.
    pub async fn search_and_resolve_all(&self, query: &str) -> Result<BatchResult> {
        let start_time = Instant::now();
        let candidates = self.scraper.search(query).await?;

        if candidates.is_empty() {
            info!("No search results for '{}'", query);
            return Ok(BatchResult {
                ok: true,
                results: Vec::new(),
            });
        }

        let total = candidates.len();
        let results: Vec<ResolvedMovie> = stream::iter(candidates.into_iter().enumerate())
            .map(|(index, candidate)| async move {
                self.resolve_candidate(index, total, &candidate).await
            })
            .buffered(self.max_concurrent)
            .filter_map(|resolved| async move { resolved })
            .collect()
            .await;

        info!(
            "🎉 Resolved {}/{} candidates for '{}' in {:.2}s",
            results.len(),
            total,
            query,
            start_time.elapsed().as_secs_f64()
        );

        Ok(BatchResult { ok: true, results })
    }

    /// Resolve one candidate through the detail and final pages
    pub async fn resolve_movie(&self, candidate: &SearchResult) -> Result<ResolvedMovie> {
        let page = self.scraper.resolve(&candidate.detail_url).await?;
        let groups = self.scraper.extract_links(&page.final_url).await?;
        Ok(ResolvedMovie::new(candidate, groups))
    }

    async fn resolve_candidate(
        &self,
        index: usize,
        total: usize,
        candidate: &SearchResult,
    ) -> Option<ResolvedMovie> {
        if candidate.detail_url.is_empty() {
            return None;
        }

        info!("🎬 Processing candidate {}/{}: {}", index + 1, total, candidate.title);

        match self.resolve_movie(candidate).await {
            Ok(movie) => Some(movie),
            Err(e) => {
                warn!("Failed to process movie '{}': {}", candidate.title, e);
                None
            }
        }
    }
}
