//! API module for the movie link resolver
//!
//! Exposes each scraping stage and the combined pipeline as JSON GET endpoints.

use anyhow::Result;
use tracing::info;

use crate::config::Config;

pub mod handlers;
pub mod models;
pub mod server;

pub use server::{router, AppState};

/// API Server for the link resolution endpoints
#[derive(Debug)]
pub struct ApiServer {
    config: Config,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Start the API server
    pub async fn start(self) -> Result<()> {
        info!(
            "🚀 Starting API server on {}:{}",
            self.config.server.host, self.config.server.port
        );

        server::start_http_server(self.config).await
    }
}
