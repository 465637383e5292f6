//! Detail page resolution stage
//!
//! Picks the best-quality download row on a detail page, follows its link to
//! the intermediate page and locates the final landing page URL there.
use scraper::{ElementRef, Html};
use tracing::{debug, info, warn};

use super::{
    absolutize, parse_quality, text_of, LinkScraper, QualitySelection, ResolvedPage, SiteSelectors,
};
use crate::error::{LinkError, Result};

/// The link chosen on a detail page
#[derive(Debug, Clone, PartialEq)]
pub struct BestLink {
    /// Link target as written in the page
    pub href: String,
    /// Rank of the winning row, `None` when the fallback button supplied the link
    pub rank: Option<u32>,
    /// Serialized markup of the winning row, used to describe the selection
    pub block_markup: Option<String>,
}

/// Select the best download link on a detail page.
///
/// Rows are ranked by their quality label. A row only replaces the current
/// best when its rank is strictly greater and it carries a qualifying link,
/// so the first row reaching the maximum wins and a link-less row never
/// displaces one with a link. Without any qualifying row, the fallback
/// button's enclosing anchor is used.
pub fn select_best_link(html: &str, selectors: &SiteSelectors) -> Option<BestLink> {
    let document = Html::parse_document(html);
    let mut best: Option<BestLink> = None;
    let mut max_quality: Option<u32> = None;

    for block in document.select(&selectors.download_row) {
        let quality_text = block
            .select(&selectors.quality_cell)
            .next()
            .map(|cell| text_of(&cell))
            .unwrap_or_default();
        let current_quality = parse_quality(&quality_text);

        if max_quality.map_or(false, |max| current_quality <= max) {
            continue;
        }

        match block
            .select(&selectors.row_link)
            .next()
            .and_then(|link| link.value().attr("href"))
        {
            Some(href) => {
                debug!("New best row '{}' (rank {})", quality_text, current_quality);
                max_quality = Some(current_quality);
                best = Some(BestLink {
                    href: href.to_string(),
                    rank: Some(current_quality),
                    block_markup: Some(block.html()),
                });
            }
            None => debug!("Row '{}' has no download link, skipping", quality_text),
        }
    }

    best.or_else(|| fallback_button_link(&document, selectors))
}

/// href of the anchor enclosing the fallback download button
fn fallback_button_link(document: &Html, selectors: &SiteSelectors) -> Option<BestLink> {
    let button = document.select(&selectors.fallback_button).next()?;
    let anchor = button
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "a")?;
    let href = anchor.value().attr("href")?;

    debug!("Using fallback download button link");
    Some(BestLink {
        href: href.to_string(),
        rank: None,
        block_markup: None,
    })
}

/// Describe the winning row from its markup snapshot
pub fn parse_selection(block_markup: Option<&str>, selectors: &SiteSelectors) -> QualitySelection {
    let mut selection = QualitySelection::default();
    let Some(markup) = block_markup else {
        return selection;
    };

    let capture = |re: &regex::Regex| {
        re.captures(markup)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    };

    if let Some(quality) = capture(&selectors.selection_quality) {
        selection.quality_label = quality;
    }
    if let Some(size) = capture(&selectors.selection_size) {
        selection.size = size;
    }
    if let Some(language) = capture(&selectors.selection_language) {
        selection.language = language;
    }

    selection
}

impl SiteSelectors {
    /// First final-host URL in a raw page body
    pub fn find_final_url(&self, body: &str) -> Option<String> {
        self.final_url.find(body).map(|m| m.as_str().to_string())
    }
}

impl LinkScraper {
    /// Resolve a detail page into its intermediate and final page URLs
    pub async fn resolve(&self, detail_url: &str) -> Result<ResolvedPage> {
        info!("📄 Fetching detail page: {}", detail_url);
        let html = self.fetcher.fetch(detail_url).await?;

        let best = select_best_link(&html, &self.selectors)
            .ok_or_else(|| LinkError::not_found("Download link not found on the page."))?;
        let intermediate_url = absolutize(detail_url, &best.href);

        info!("🔗 Following download link: {}", intermediate_url);
        let body = self.fetcher.fetch(&intermediate_url).await?;

        let Some(final_url) = self.selectors.find_final_url(&body) else {
            warn!("No final page URL on intermediate page {}", intermediate_url);
            return Err(LinkError::not_found(
                "Final download page URL not found on intermediate page.",
            ));
        };

        let selection = parse_selection(best.block_markup.as_deref(), &self.selectors);
        info!(
            "✅ Selected {} ({}, {}) -> {}",
            selection.quality_label, selection.size, selection.language, final_url
        );

        Ok(ResolvedPage {
            intermediate_url,
            final_url,
            selection,
        })
    }
}
