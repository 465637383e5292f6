//! Catalog search stage
use scraper::{Html, Selector};
use tracing::{debug, info};

use super::{absolutize, text_of, LinkScraper, SearchResult, SiteSelectors};
use crate::error::Result;

/// Catalog search URL for `query`
pub fn build_search_url(catalog_base: &str, query: &str) -> String {
    format!(
        "{}/?s={}",
        catalog_base.trim_end_matches('/'),
        urlencoding::encode(query)
    )
}

/// Extract result records from a search results page, in document order.
///
/// Items without a title link are dropped. Secondary fields fall back to
/// their defaults independently.
pub fn parse_search_results(html: &str, page_url: &str, selectors: &SiteSelectors) -> Vec<SearchResult> {
    let document = Html::parse_document(html);
    let mut results = Vec::new();

    for item in document.select(&selectors.result_item) {
        let Some((title_link, href)) = item
            .select(&selectors.title_link)
            .next()
            .and_then(|link| link.value().attr("href").map(|href| (link, href)))
        else {
            debug!("Skipping result item without a title link");
            continue;
        };

        let first_text = |selector: &Selector| item.select(selector).next().map(|el| text_of(&el));

        results.push(SearchResult {
            title: text_of(&title_link),
            detail_url: detail_url(page_url, href),
            year: first_text(&selectors.year).unwrap_or_else(|| "N/A".to_string()),
            media_type: first_text(&selectors.media_type).unwrap_or_else(|| super::UNKNOWN.to_string()),
            description: first_text(&selectors.description).unwrap_or_default(),
            thumbnail_url: item
                .select(&selectors.thumbnail)
                .next()
                .and_then(|img| img.value().attr("src"))
                .map(|src| absolutize(page_url, src))
                .unwrap_or_default(),
        });
    }

    results
}

/// Absolute detail URL. A blank href stays empty so the candidate is skipped later.
fn detail_url(page_url: &str, href: &str) -> String {
    if href.trim().is_empty() {
        String::new()
    } else {
        absolutize(page_url, href)
    }
}

impl LinkScraper {
    /// Search the catalog and list candidate titles
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let search_url = build_search_url(&self.catalog_base, query);
        info!("🔍 Searching catalog: {}", search_url);

        let html = self.fetcher.fetch(&search_url).await?;
        let results = parse_search_results(&html, &search_url, &self.selectors);

        info!("📚 Found {} results for '{}'", results.len(), query);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::links::fetch::testing::StaticFetcher;
    use std::sync::Arc;

    const PAGE_URL: &str = "https://movielinkhub.fun/?s=inception";

    const SEARCH_PAGE: &str = r#"
        <html><body>
          <div class="result-item">
            <article>
              <div class="image"><img src="/posters/inception.jpg" alt="Inception"></div>
              <div class="details">
                <div class="title"><a href="https://movielinkhub.fun/movies/inception-2010/">Inception (2010)</a></div>
                <div class="meta"><span class="year">2010</span></div>
                <span class="movies">Movie</span>
                <div class="contenido"><p> A thief who steals corporate secrets. </p></div>
              </div>
            </article>
          </div>
          <div class="result-item">
            <div class="details"><span class="year">1999</span></div>
          </div>
          <div class="result-item">
            <div class="title"><a href="/tvshows/inception-the-cobol-job/">Inception: The Cobol Job</a></div>
          </div>
        </body></html>
    "#;

    fn selectors() -> SiteSelectors {
        SiteSelectors::from_config(&SiteConfig::default()).unwrap()
    }

    #[test]
    fn test_build_search_url_encodes_query() {
        assert_eq!(
            build_search_url("https://movielinkhub.fun/", "the dark knight"),
            "https://movielinkhub.fun/?s=the%20dark%20knight"
        );
    }

    #[test]
    fn test_parse_search_results() {
        let results = parse_search_results(SEARCH_PAGE, PAGE_URL, &selectors());
        assert_eq!(results.len(), 2);

        let first = &results[0];
        assert_eq!(first.title, "Inception (2010)");
        assert_eq!(first.detail_url, "https://movielinkhub.fun/movies/inception-2010/");
        assert_eq!(first.year, "2010");
        assert_eq!(first.media_type, "Movie");
        assert_eq!(first.description, "A thief who steals corporate secrets.");
        assert_eq!(first.thumbnail_url, "https://movielinkhub.fun/posters/inception.jpg");
    }

    #[test]
    fn test_missing_secondary_fields_use_defaults() {
        let results = parse_search_results(SEARCH_PAGE, PAGE_URL, &selectors());

        let second = &results[1];
        assert_eq!(second.title, "Inception: The Cobol Job");
        assert_eq!(second.detail_url, "https://movielinkhub.fun/tvshows/inception-the-cobol-job/");
        assert_eq!(second.year, "N/A");
        assert_eq!(second.media_type, "Unknown");
        assert_eq!(second.description, "");
        assert_eq!(second.thumbnail_url, "");
    }

    #[test]
    fn test_title_link_without_href_is_dropped() {
        let html = r#"<div class="result-item"><div class="title"><a>No link</a></div></div>"#;
        assert!(parse_search_results(html, PAGE_URL, &selectors()).is_empty());
    }

    #[test]
    fn test_blank_href_keeps_empty_detail_url() {
        let html = r#"<div class="result-item"><div class="title"><a href=" ">Ghost</a></div></div>"#;
        let results = parse_search_results(html, PAGE_URL, &selectors());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Ghost");
        assert_eq!(results[0].detail_url, "");
    }

    #[test]
    fn test_thumbnail_uses_first_image_with_src() {
        let html = r#"
            <div class="result-item">
              <img alt="placeholder">
              <img src="/posters/ghost.jpg">
              <div class="title"><a href="/movies/ghost/">Ghost</a></div>
            </div>
        "#;
        let results = parse_search_results(html, PAGE_URL, &selectors());
        assert_eq!(results[0].thumbnail_url, "https://movielinkhub.fun/posters/ghost.jpg");
    }

    #[tokio::test]
    async fn test_search_fetches_catalog_page() {
        let fetcher = Arc::new(StaticFetcher::new().page(PAGE_URL, SEARCH_PAGE));
        let scraper = LinkScraper::new(fetcher.clone(), &SiteConfig::default()).unwrap();

        let results = scraper.search("inception").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(*fetcher.requests.lock().unwrap(), vec![PAGE_URL.to_string()]);
    }

    #[tokio::test]
    async fn test_search_propagates_fetch_errors() {
        let scraper = LinkScraper::new(Arc::new(StaticFetcher::new()), &SiteConfig::default()).unwrap();
        let err = scraper.search("inception").await.unwrap_err();
        assert!(err.is_fetch_error());
    }
}
