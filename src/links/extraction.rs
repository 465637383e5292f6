//! Final page link extraction stage
use scraper::{ElementRef, Html};
use tracing::{debug, info};

use super::{text_of, LinkScraper, ProviderLink, QualityGroups, SiteSelectors};
use crate::error::{LinkError, Result};

/// Group the provider links of a final page by quality heading.
///
/// Each quality section takes its links from the first link container that
/// follows the section start in document order. Sections without a heading
/// or without links are left out.
pub fn parse_quality_groups(html: &str, selectors: &SiteSelectors) -> QualityGroups {
    let document = Html::parse_document(html);
    let mut groups = QualityGroups::new();

    for section in document.select(&selectors.quality_section) {
        let Some(heading) = section.select(&selectors.quality_heading).next() else {
            debug!("Skipping quality section without a heading");
            continue;
        };
        let quality = text_of(&heading);

        let links: Vec<ProviderLink> = next_element_named(section, &selectors.link_container_tag)
            .map(|container| {
                container
                    .select(&selectors.provider_link)
                    .filter_map(|link| {
                        link.value().attr("href").map(|href| ProviderLink {
                            provider: text_of(&link),
                            url: href.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        if links.is_empty() {
            debug!("Quality section '{}' has no links", quality);
            continue;
        }

        groups.insert(quality, links);
    }

    groups
}

/// First element named `tag` after the start of `start`, in document order
fn next_element_named<'a>(start: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    let is_match = |element: &ElementRef| element.value().name() == tag;

    if let Some(found) = start.descendants().skip(1).filter_map(ElementRef::wrap).find(is_match) {
        return Some(found);
    }

    let mut node = Some(*start);
    while let Some(current) = node {
        for sibling in current.next_siblings() {
            if let Some(found) = sibling.descendants().filter_map(ElementRef::wrap).find(is_match) {
                return Some(found);
            }
        }
        node = current.parent();
    }

    None
}

impl LinkScraper {
    /// Extract every quality-grouped provider link from the final page
    pub async fn extract_links(&self, final_url: &str) -> Result<QualityGroups> {
        info!("📄 Fetching final page: {}", final_url);
        let html = self.fetcher.fetch(final_url).await?;

        let groups = parse_quality_groups(&html, &self.selectors);
        if groups.is_empty() {
            return Err(LinkError::not_found("No download links found"));
        }

        info!("✅ Extracted {} quality groups", groups.len());
        Ok(groups)
    }
}
