//! Run orchestration and user-facing reporting.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;

use shelfpix_core::{
    load_catalog, save_catalog, Enricher, ImageStore, RunSummary, RunnerConfig, WebClientBuilder,
};

/// Load the catalog, enrich every entry, persist the result, and print a
/// summary. Per-entry failures never abort the run; only catalog load and
/// save are fatal.
pub async fn run_fetch(config: RunnerConfig, timeout: Duration) -> Result<()> {
    let entries = load_catalog(&config.catalog_path).with_context(|| {
        format!(
            "Failed to load catalog from {}",
            config.catalog_path.display()
        )
    })?;

    println!("Catalog Image Fetch");
    println!("===================");
    println!("Started: {}", Utc::now().to_rfc3339());
    println!("Products in catalog: {}", entries.len());
    println!("Images directory: {}", config.images_dir.display());
    println!();

    let client = WebClientBuilder::new()
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")?;
    let store = ImageStore::new(config.images_dir.clone(), config.url_prefix.clone());
    let enricher = Enricher::new(client, store, config.delay).with_limit(config.limit);

    let start = Instant::now();
    let (entries, summary) = enricher.run(entries).await;

    save_catalog(&config.catalog_path, &entries).with_context(|| {
        format!(
            "Failed to save catalog to {}",
            config.catalog_path.display()
        )
    })?;

    print_summary(&summary, start.elapsed(), &config);
    Ok(())
}

fn print_summary(summary: &RunSummary, elapsed: Duration, config: &RunnerConfig) {
    println!();
    println!("Fetch Results");
    println!("=============");
    println!("Duration: {:.1}s", elapsed.as_secs_f64());
    println!("Entries processed: {}", summary.total);
    println!(
        "Succeeded: {} ({:.1}%)",
        summary.succeeded,
        pct(summary.succeeded, summary.total)
    );
    println!("  Cache hits: {}", summary.cache_hits);
    println!("  Downloaded: {}", summary.downloaded);
    println!("  Inline images written: {}", summary.inline_written);
    println!("No candidate found: {}", summary.no_candidate);
    println!("Persist failures: {}", summary.persist_failed);
    if summary.skipped > 0 {
        println!("Skipped (empty name): {}", summary.skipped);
    }
    println!();
    println!("Catalog updated: {}", config.catalog_path.display());
    println!("Images saved to: {}", config.images_dir.display());
}

/// Count catalog entries whose resolved image file is present on disk.
pub fn print_stats(catalog_path: &Path, images_dir: &Path, url_prefix: &str) -> Result<()> {
    let entries = load_catalog(catalog_path)
        .with_context(|| format!("Failed to load catalog from {}", catalog_path.display()))?;
    let store = ImageStore::new(images_dir, url_prefix);

    let cached = entries
        .iter()
        .filter(|e| store.exists(&store.resolve(&e.name)))
        .count();

    println!("Image Cache Statistics");
    println!("======================");
    println!("Catalog: {}", catalog_path.display());
    println!("Images directory: {}", images_dir.display());
    println!(
        "Entries with a local image: {}/{} ({:.1}%)",
        cached,
        entries.len(),
        pct(cached, entries.len())
    );
    Ok(())
}

fn pct(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64 * 100.0
    }
}
