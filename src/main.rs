use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use tracing::info;

use catalog_scraper::config::{RendererKind, ServiceConfig};
use catalog_scraper::server::{self, AppState};
use catalog_scraper::{renderer, ProductExtractor};

#[derive(Parser)]
#[command(
    name = "catalog_scraper",
    about = "Extract product listings from e-commerce category pages",
    version
)]
struct Cli {
    /// JSON config file; missing keys use built-in defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP scraper worker
    Serve {
        #[arg(long, env = "PORT")]
        port: Option<u16>,
        #[arg(long, value_enum)]
        renderer: Option<RendererKind>,
    },
    /// Extract products once and print them as JSON
    #[command(group(ArgGroup::new("input").required(true).args(["url", "html_file"])))]
    Extract {
        /// Category page to render
        #[arg(long)]
        url: Option<String>,
        /// Already rendered HTML to read instead of rendering a page
        #[arg(long)]
        html_file: Option<PathBuf>,
        /// URL reported as the result's source when reading a file
        #[arg(long)]
        source: Option<String>,
        #[arg(long, value_enum)]
        renderer: Option<RendererKind>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ServiceConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { port, renderer: kind } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(kind) = kind {
                config.renderer = kind;
            }
            info!("starting catalog_scraper v{}", env!("CARGO_PKG_VERSION"));

            let renderer = renderer::from_config(&config)
                .await
                .context("failed to start page renderer")?;
            let extractor = ProductExtractor::new(config.site.clone());
            let state = Arc::new(AppState::new(extractor, renderer));
            server::start(config.port, state).await
        }
        Commands::Extract { url, html_file, source, renderer: kind } => {
            if let Some(kind) = kind {
                config.renderer = kind;
            }
            let extractor = ProductExtractor::new(config.site.clone());

            let result = match (url, html_file) {
                (Some(url), _) => {
                    if !config.site.permits(&url) {
                        bail!("{url} is not under {}", config.site.origin());
                    }
                    let renderer = renderer::from_config(&config)
                        .await
                        .context("failed to start page renderer")?;
                    let html = renderer.render(&url).await.context("scrape failed")?;
                    extractor.extract_from_html(&html, &url)
                }
                (None, Some(path)) => {
                    let html = std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    let source = source.unwrap_or_else(|| path.display().to_string());
                    extractor.extract_from_html(&html, &source)
                }
                (None, None) => bail!("either --url or --html-file is required"),
            };

            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}
