use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use movielinks::api::models::CombinedResponse;
use movielinks::api::ApiServer;
use movielinks::{Config, LinkPipeline};

#[derive(Parser)]
#[command(name = "movielinks")]
#[command(version, about = "Resolve movie searches into direct download links")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,
        /// Listen port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Search the catalog
    Search {
        query: String,
    },
    /// Select the best download of a detail page and follow it to the final page
    Resolve {
        /// Detail page URL
        url: String,
    },
    /// List the download options of a final page
    Links {
        /// Final page URL
        url: String,
    },
    /// Search and resolve the download links of every result
    All {
        query: String,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "movielinks=debug,info"
    } else {
        "movielinks=info,warn"
    };

    let filter = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var("MOVIELINKS_LOG_LEVEL"))
        .ok()
        .and_then(|filter| EnvFilter::try_new(filter).ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(&path.to_string_lossy())?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };

    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(cli.config.as_ref())?;

    if let Commands::Serve { host, port } = &cli.command {
        if let Some(host) = host {
            config.server.host = host.clone();
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
        info!("{}", config.summary());
        return ApiServer::new(config).start().await;
    }

    let pipeline = LinkPipeline::from_config(&config)?;

    match cli.command {
        Commands::Search { query } => print_json(&pipeline.scraper().search(&query).await?),
        Commands::Resolve { url } => print_json(&pipeline.scraper().resolve(&url).await?),
        Commands::Links { url } => print_json(&pipeline.scraper().extract_links(&url).await?),
        Commands::All { query } => {
            let batch = pipeline.search_and_resolve_all(&query).await?;
            print_json(&CombinedResponse {
                ok: batch.ok,
                developer: config.server.developer.clone(),
                results: batch.results,
            })
        }
        Commands::Serve { .. } => Ok(()),
    }
}
