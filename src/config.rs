use anyhow::{anyhow, Result};
use scraper::Selector;
use serde::{Deserialize, Serialize};

/// Configuration for the movie link resolver
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// API server settings
    pub server: ServerConfig,

    /// Upstream site locations and markup conventions
    pub sites: SiteConfig,

    /// Outbound HTTP settings
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Listen port
    pub port: u16,

    /// Value reported in the `developer` field of combined results
    pub developer: String,
}

/// Upstream markup conventions.
///
/// These mirror the current structure of the catalog, detail and final pages.
/// They are not protocol guarantees and break silently if the upstream sites
/// change their markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Catalog site root, searched as `{catalog_base}/?s={query}`
    pub catalog_base: String,

    /// Host of the final landing page, located in the intermediate page body
    pub final_host: String,

    // Search results page
    pub result_item_selector: String,
    pub title_link_selector: String,
    pub year_selector: String,
    pub type_selector: String,
    pub description_selector: String,
    pub thumbnail_selector: String,

    // Detail page
    pub download_row_selector: String,
    pub quality_cell_selector: String,
    pub row_link_selector: String,
    pub fallback_button_selector: String,

    // Final page
    pub quality_section_selector: String,
    pub quality_heading_selector: String,
    pub link_container_tag: String,
    pub provider_link_selector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-fetch timeout in seconds
    pub timeout_seconds: u64,

    /// User agent sent to the upstream sites
    pub user_agent: String,

    /// Candidates resolved at once by the combined pipeline (1 = sequential)
    pub max_concurrent_candidates: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            developer: "Mahir Labib".to_string(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            catalog_base: "https://movielinkhub.fun".to_string(),
            final_host: "linkedmoviehub.top".to_string(),
            result_item_selector: ".result-item".to_string(),
            title_link_selector: ".title a".to_string(),
            year_selector: ".year".to_string(),
            type_selector: ".movies".to_string(),
            description_selector: ".contenido p".to_string(),
            thumbnail_selector: "img[src]".to_string(),
            download_row_selector: "tr[id^='link-']".to_string(),
            quality_cell_selector: ".qua".to_string(),
            row_link_selector: "a[href*='/links/']".to_string(),
            fallback_button_selector: "button.downbtn".to_string(),
            quality_section_selector: "div.quality".to_string(),
            quality_heading_selector: "h2".to_string(),
            link_container_tag: "center".to_string(),
            provider_link_selector: "a.down-btn".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            max_concurrent_candidates: 1,
        }
    }
}

impl SiteConfig {
    fn selectors(&self) -> [(&'static str, &str); 13] {
        [
            ("result_item_selector", self.result_item_selector.as_str()),
            ("title_link_selector", self.title_link_selector.as_str()),
            ("year_selector", self.year_selector.as_str()),
            ("type_selector", self.type_selector.as_str()),
            ("description_selector", self.description_selector.as_str()),
            ("thumbnail_selector", self.thumbnail_selector.as_str()),
            ("download_row_selector", self.download_row_selector.as_str()),
            ("quality_cell_selector", self.quality_cell_selector.as_str()),
            ("row_link_selector", self.row_link_selector.as_str()),
            ("fallback_button_selector", self.fallback_button_selector.as_str()),
            ("quality_section_selector", self.quality_section_selector.as_str()),
            ("quality_heading_selector", self.quality_heading_selector.as_str()),
            ("provider_link_selector", self.provider_link_selector.as_str()),
        ]
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_paths = [
            "movielinks.toml",
            "config/movielinks.toml",
            "/etc/movielinks/config.toml",
        ];

        for path in &config_paths {
            if std::path::Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config file {}: {}", path, e),
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from a specific TOML file, then apply environment overrides
    pub fn from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&config_str)?;
        config.apply_env();
        tracing::info!("📄 Loaded configuration from: {}", path);
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(port) = std::env::var("MOVIELINKS_PORT") {
            self.server.port = port.parse().unwrap_or(self.server.port);
        }

        if let Ok(base) = std::env::var("MOVIELINKS_CATALOG_BASE") {
            self.sites.catalog_base = base;
        }

        if let Ok(host) = std::env::var("MOVIELINKS_FINAL_HOST") {
            self.sites.final_host = host;
        }

        if let Ok(timeout) = std::env::var("MOVIELINKS_TIMEOUT") {
            self.http.timeout_seconds = timeout.parse().unwrap_or(self.http.timeout_seconds);
        }

        if let Ok(concurrency) = std::env::var("MOVIELINKS_CONCURRENCY") {
            self.http.max_concurrent_candidates =
                concurrency.parse().unwrap_or(self.http.max_concurrent_candidates);
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("port must be greater than 0"));
        }

        if self.http.max_concurrent_candidates == 0 {
            return Err(anyhow!("max_concurrent_candidates must be greater than 0"));
        }

        if self.http.timeout_seconds == 0 {
            return Err(anyhow!("timeout_seconds must be greater than 0"));
        }

        url::Url::parse(&self.sites.catalog_base)
            .map_err(|e| anyhow!("Invalid catalog_base '{}': {}", self.sites.catalog_base, e))?;

        if self.sites.final_host.trim().is_empty() {
            return Err(anyhow!("final_host must not be empty"));
        }

        if self.sites.link_container_tag.trim().is_empty() {
            return Err(anyhow!("link_container_tag must not be empty"));
        }

        for (name, selector) in self.sites.selectors() {
            if Selector::parse(selector).is_err() {
                return Err(anyhow!("Invalid CSS selector for {}: '{}'", name, selector));
            }
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Movie Links Configuration:\n\
            - Listen: {}:{}\n\
            - Catalog: {}\n\
            - Final Host: {}\n\
            - Timeout: {}s\n\
            - Concurrent Candidates: {}",
            self.server.host,
            self.server.port,
            self.sites.catalog_base,
            self.sites.final_host,
            self.http.timeout_seconds,
            self.http.max_concurrent_candidates
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_catalog_base(mut self, base: impl Into<String>) -> Self {
        self.config.sites.catalog_base = base.into();
        self
    }

    pub fn with_final_host(mut self, host: impl Into<String>) -> Self {
        self.config.sites.final_host = host.into();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.config.http.timeout_seconds = seconds;
        self
    }

    pub fn with_concurrency(mut self, candidates: usize) -> Self {
        self.config.http.max_concurrent_candidates = candidates;
        self
    }

    pub fn with_developer(mut self, developer: impl Into<String>) -> Self {
        self.config.server.developer = developer.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.sites.final_host, "linkedmoviehub.top");
        assert_eq!(config.http.max_concurrent_candidates, 1);
        assert_eq!(config.sites.thumbnail_selector, "img[src]");
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_port(9000)
            .with_catalog_base("http://localhost:1234")
            .with_concurrency(4)
            .build();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.sites.catalog_base, "http://localhost:1234");
        assert_eq!(config.http.max_concurrent_candidates, 4);
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());
        assert!(ConfigBuilder::new().with_concurrency(0).build().validate().is_err());
        assert!(ConfigBuilder::new().with_catalog_base("not a url").build().validate().is_err());

        let mut config = Config::default();
        config.sites.row_link_selector = "a[href*=".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[server]\nport = 9100\n").unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.sites.download_row_selector, "tr[id^='link-']");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movielinks.toml");
        let path = path.to_str().unwrap();

        let config = ConfigBuilder::new().with_final_host("example.org").build();
        config.save(path).unwrap();

        let loaded = Config::from_file(path).unwrap();
        assert_eq!(loaded.sites.final_host, config.sites.final_host);
    }
}
