use async_trait::async_trait;
use movielinks::{LinkError, PageFetcher, Result};
use std::collections::HashMap;
use std::sync::Mutex;

pub const CATALOG: &str = "https://movielinkhub.test";

/// In-memory pages keyed by URL
#[derive(Default)]
pub struct MapFetcher {
    pages: HashMap<String, String>,
    pub requests: Mutex<Vec<String>>,
}

impl MapFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), body.into());
        self
    }
}

#[async_trait]
impl PageFetcher for MapFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| LinkError::UpstreamStatus {
            status: 404,
            url: url.to_string(),
        })
    }
}

pub fn search_page(items: &[(&str, &str)]) -> String {
    let items: String = items
        .iter()
        .map(|(title, href)| {
            format!(
                r#"<div class="result-item"><article>
                     <div class="image"><img src="https://img.test/{title}.jpg"></div>
                     <div class="title"><a href="{href}">{title}</a></div>
                     <span class="year">2010</span><span class="movies">Movie</span>
                     <div class="contenido"><p>About {title}</p></div>
                   </article></div>"#
            )
        })
        .collect();
    format!("<html><body><div class=\"search-page\">{}</div></body></html>", items)
}

pub fn row(id: u32, quality: &str, href: Option<&str>) -> String {
    let link = href
        .map(|href| format!(r#"<a href="{}">Download</a>"#, href))
        .unwrap_or_default();
    format!(
        r#"<tr id="link-{id}"><td>{link}</td><td><strong class="qua">{quality}</strong></td><td><span class="lan">(English)</span></td><td><span class="siz">[1.4 GB]</span></td></tr>"#
    )
}

pub fn detail_page(rows: &[String], extra: &str) -> String {
    format!(
        "<html><body><table><tbody>{}</tbody></table>{}</body></html>",
        rows.concat(),
        extra
    )
}

pub fn intermediate_page(final_url: &str) -> String {
    format!(r#"<html><body><script>window.location = "{}";</script></body></html>"#, final_url)
}

pub fn final_page(sections: Vec<(&str, Vec<(&str, &str)>)>) -> String {
    let body: String = sections
        .iter()
        .map(|(quality, links)| {
            let anchors: String = links
                .iter()
                .map(|(provider, url)| format!(r#"<a class="down-btn" href="{}">{}</a>"#, url, provider))
                .collect();
            format!(r#"<div class="quality"><h2>{}</h2></div><center>{}</center>"#, quality, anchors)
        })
        .collect();
    format!("<html><body>{}</body></html>", body)
}
