mod orchestrator;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use shelfpix_core::RunnerConfig;

#[derive(Parser)]
#[command(name = "shelfpix")]
#[command(about = "Fetch and cache product images for the catalog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch images for catalog entries missing a cached local image
    Fetch {
        /// Catalog JSON file
        #[arg(long, default_value = "app/data/catalog.json")]
        catalog: PathBuf,
        /// Directory downloaded images are saved to
        #[arg(long, default_value = "public/images")]
        images_dir: PathBuf,
        /// Public URL prefix written into the catalog
        #[arg(long, default_value = "/images")]
        url_prefix: String,
        /// Delay between network requests, in milliseconds
        #[arg(long, default_value_t = 2000)]
        delay_ms: u64,
        /// HTTP request timeout, in seconds
        #[arg(long, default_value_t = 15)]
        timeout_secs: u64,
        /// Enrich at most this many entries
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Report how many catalog entries already have a local image
    Stats {
        /// Catalog JSON file
        #[arg(long, default_value = "app/data/catalog.json")]
        catalog: PathBuf,
        /// Directory images are saved to
        #[arg(long, default_value = "public/images")]
        images_dir: PathBuf,
        /// Public URL prefix written into the catalog
        #[arg(long, default_value = "/images")]
        url_prefix: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            catalog,
            images_dir,
            url_prefix,
            delay_ms,
            timeout_secs,
            limit,
        } => {
            let config = RunnerConfig {
                catalog_path: catalog,
                images_dir,
                url_prefix,
                delay: Duration::from_millis(delay_ms),
                limit,
            };
            orchestrator::run_fetch(config, Duration::from_secs(timeout_secs)).await?;
        }
        Commands::Stats {
            catalog,
            images_dir,
            url_prefix,
        } => {
            orchestrator::print_stats(&catalog, &images_dir, &url_prefix)?;
        }
    }

    Ok(())
}
