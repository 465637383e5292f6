//! Download link resolution across the catalog, detail and final pages
//!
//! Each stage fetches one page through a [`PageFetcher`] and parses it into
//! owned records. Parsing is synchronous and never holds a document across an
//! await point.

pub mod extraction;
pub mod fetch;
pub mod quality;
pub mod resolution;
pub mod search;

pub use extraction::parse_quality_groups;
pub use fetch::{HttpFetcher, PageFetcher};
pub use quality::parse_quality;
pub use resolution::{parse_selection, select_best_link, BestLink};
pub use search::{build_search_url, parse_search_results};

use regex::Regex;
use scraper::{ElementRef, Selector};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;
use url::Url;

use crate::config::SiteConfig;
use crate::error::{LinkError, Result};

pub const UNKNOWN: &str = "Unknown";

/// One catalog entry from the search results page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub title: String,
    #[serde(rename = "url")]
    pub detail_url: String,
    pub year: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub description: String,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
}

/// Descriptive metadata of the download row that won selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualitySelection {
    #[serde(rename = "quality")]
    pub quality_label: String,
    pub size: String,
    pub language: String,
}

impl Default for QualitySelection {
    fn default() -> Self {
        Self {
            quality_label: UNKNOWN.to_string(),
            size: UNKNOWN.to_string(),
            language: UNKNOWN.to_string(),
        }
    }
}

/// Output of the resolution stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedPage {
    #[serde(rename = "intermediate_page_url")]
    pub intermediate_url: String,
    #[serde(rename = "final_page_url")]
    pub final_url: String,
    #[serde(rename = "selected_quality_info")]
    pub selection: QualitySelection,
}

/// A single named download option
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderLink {
    pub provider: String,
    pub url: String,
}

/// Provider links listed under one quality heading
#[derive(Debug, Clone, PartialEq)]
pub struct QualityGroup {
    pub quality: String,
    pub links: Vec<ProviderLink>,
}

/// Quality groups in page order, keyed by heading.
///
/// Serializes as a JSON object whose keys keep page order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualityGroups {
    groups: Vec<QualityGroup>,
}

impl QualityGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a group. A repeated heading replaces the earlier links but keeps its position.
    pub fn insert(&mut self, quality: String, links: Vec<ProviderLink>) {
        match self.groups.iter_mut().find(|group| group.quality == quality) {
            Some(existing) => existing.links = links,
            None => self.groups.push(QualityGroup { quality, links }),
        }
    }

    pub fn get(&self, quality: &str) -> Option<&[ProviderLink]> {
        self.groups
            .iter()
            .find(|group| group.quality == quality)
            .map(|group| group.links.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &QualityGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl IntoIterator for QualityGroups {
    type Item = QualityGroup;
    type IntoIter = std::vec::IntoIter<QualityGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl Serialize for QualityGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.quality, &group.links)?;
        }
        map.end()
    }
}

/// Compiled form of [`SiteConfig`]
#[derive(Debug)]
pub struct SiteSelectors {
    pub result_item: Selector,
    pub title_link: Selector,
    pub year: Selector,
    pub media_type: Selector,
    pub description: Selector,
    pub thumbnail: Selector,
    pub download_row: Selector,
    pub quality_cell: Selector,
    pub row_link: Selector,
    pub fallback_button: Selector,
    pub quality_section: Selector,
    pub quality_heading: Selector,
    pub link_container_tag: String,
    pub provider_link: Selector,
    pub final_url: Regex,
    pub selection_quality: Regex,
    pub selection_size: Regex,
    pub selection_language: Regex,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| LinkError::Selector(format!("'{}': {:?}", css, e)))
}

fn pattern(re: &str) -> Result<Regex> {
    Regex::new(re).map_err(|e| LinkError::Config(format!("invalid pattern '{}': {}", re, e)))
}

impl SiteSelectors {
    pub fn from_config(sites: &SiteConfig) -> Result<Self> {
        if sites.final_host.trim().is_empty() {
            return Err(LinkError::Config("final_host must not be empty".to_string()));
        }

        Ok(Self {
            result_item: selector(&sites.result_item_selector)?,
            title_link: selector(&sites.title_link_selector)?,
            year: selector(&sites.year_selector)?,
            media_type: selector(&sites.type_selector)?,
            description: selector(&sites.description_selector)?,
            thumbnail: selector(&sites.thumbnail_selector)?,
            download_row: selector(&sites.download_row_selector)?,
            quality_cell: selector(&sites.quality_cell_selector)?,
            row_link: selector(&sites.row_link_selector)?,
            fallback_button: selector(&sites.fallback_button_selector)?,
            quality_section: selector(&sites.quality_section_selector)?,
            quality_heading: selector(&sites.quality_heading_selector)?,
            link_container_tag: sites.link_container_tag.trim().to_ascii_lowercase(),
            provider_link: selector(&sites.provider_link_selector)?,
            final_url: pattern(&format!(
                r#"https?://{}[^\s'"]+"#,
                regex::escape(sites.final_host.trim())
            ))?,
            selection_quality: pattern(r#"class=['"]qua['"]>([^<]+)"#)?,
            selection_size: pattern(r#"class=['"]siz['"]>\[([^\]]+)"#)?,
            selection_language: pattern(r#"class=['"]lan['"]>\(([^)]+)"#)?,
        })
    }
}

/// Scraper for the three dependent pages.
///
/// The stages live in [`search`], [`resolution`] and [`extraction`].
#[derive(Clone)]
pub struct LinkScraper {
    fetcher: Arc<dyn PageFetcher>,
    selectors: Arc<SiteSelectors>,
    catalog_base: String,
}

impl LinkScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>, sites: &SiteConfig) -> Result<Self> {
        Url::parse(&sites.catalog_base)?;

        Ok(Self {
            fetcher,
            selectors: Arc::new(SiteSelectors::from_config(sites)?),
            catalog_base: sites.catalog_base.clone(),
        })
    }

    pub fn selectors(&self) -> &SiteSelectors {
        &self.selectors
    }
}

/// Visible text with each fragment trimmed and the fragments concatenated
pub(crate) fn text_of(element: &ElementRef) -> String {
    element.text().map(str::trim).collect()
}

/// Resolve `href` against `base`, keeping the raw value when it cannot be joined
pub(crate) fn absolutize(base: &str, href: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(href))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}
