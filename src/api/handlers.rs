//! API request handlers

use serde_json::Value;
use tracing::info;

use super::models::{required, CombinedResponse, QueryParams, SearchResponse, UrlParams};
use crate::error::Result;
use crate::links::{QualityGroups, ResolvedPage};
use crate::pipeline::LinkPipeline;

/// Handle health check requests
pub async fn health_check() -> Value {
    serde_json::json!({
        "status": "healthy",
        "service": "movielinks",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    })
}

/// Step 1: search the catalog
pub async fn search(pipeline: &LinkPipeline, params: &QueryParams) -> Result<SearchResponse> {
    let query = required(&params.query, "Query")?;
    let results = pipeline.scraper().search(query).await?;

    Ok(SearchResponse {
        query: query.to_string(),
        results,
    })
}

/// Step 2: select the best download row of a detail page and follow it
pub async fn download_links(pipeline: &LinkPipeline, params: &UrlParams) -> Result<ResolvedPage> {
    let url = required(&params.url, "URL")?;
    pipeline.scraper().resolve(url).await
}

/// Step 3: list every download option of a final page
pub async fn final_links(pipeline: &LinkPipeline, params: &UrlParams) -> Result<QualityGroups> {
    let url = required(&params.url, "URL")?;
    pipeline.scraper().extract_links(url).await
}

/// All steps for every search result
pub async fn search_and_resolve_all(
    pipeline: &LinkPipeline,
    developer: &str,
    params: &QueryParams,
) -> Result<CombinedResponse> {
    let query = required(&params.query, "Query")?;
    info!("🚀 Resolving all links for '{}'", query);

    let batch = pipeline.search_and_resolve_all(query).await?;

    Ok(CombinedResponse {
        ok: batch.ok,
        developer: developer.to_string(),
        results: batch.results,
    })
}
