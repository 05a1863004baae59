//! Per-entry enrichment state machine and run orchestration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::ImageStore;
use crate::catalog::CatalogEntry;
use crate::extract::{extract_candidates, ImageCandidate};
use crate::http::HttpClient;
use crate::persist::persist_candidate;
use crate::query::{build_query, search_url};

/// Configuration for an enrichment run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Catalog store location.
    pub catalog_path: PathBuf,
    /// Directory downloaded images are written to.
    pub images_dir: PathBuf,
    /// Public URL prefix written into catalog entries.
    pub url_prefix: String,
    /// Pause between entries that touch the network.
    pub delay: Duration,
    /// Enrich at most this many entries; the rest pass through untouched.
    pub limit: Option<usize>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("app/data/catalog.json"),
            images_dir: PathBuf::from("public/images"),
            url_prefix: "/images".to_string(),
            delay: Duration::from_millis(2000),
            limit: None,
        }
    }
}

/// Terminal state of one entry's trip through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOutcome {
    /// A file already occupied the resolved path; no network activity.
    CacheHit,
    /// A remote candidate was downloaded to the resolved path.
    Downloaded,
    /// An inline candidate was written to the resolved path.
    InlineWritten,
    /// Search failed or yielded no usable candidate; entry left untouched.
    NoCandidate,
    /// A candidate was found but could not be persisted; entry left untouched.
    PersistFailed,
    /// Entry had an empty name and was skipped untouched.
    Skipped,
}

impl EntryOutcome {
    /// Whether the entry ended referencing a local image.
    pub fn is_success(self) -> bool {
        matches!(
            self,
            EntryOutcome::CacheHit | EntryOutcome::Downloaded | EntryOutcome::InlineWritten
        )
    }

    /// Whether reaching this outcome involved network activity.
    pub fn touched_network(self) -> bool {
        !matches!(self, EntryOutcome::CacheHit | EntryOutcome::Skipped)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntryOutcome::CacheHit => "cache_hit",
            EntryOutcome::Downloaded => "downloaded",
            EntryOutcome::InlineWritten => "inline_written",
            EntryOutcome::NoCandidate => "no_candidate",
            EntryOutcome::PersistFailed => "persist_failed",
            EntryOutcome::Skipped => "skipped",
        }
    }
}

/// Outcome for a single catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryResult {
    pub name: String,
    pub outcome: EntryOutcome,
}

/// Aggregate results of an enrichment run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub cache_hits: usize,
    pub downloaded: usize,
    pub inline_written: usize,
    pub no_candidate: usize,
    pub persist_failed: usize,
    pub skipped: usize,
    pub entry_results: Vec<EntryResult>,
}

impl RunSummary {
    fn record(&mut self, name: &str, outcome: EntryOutcome) {
        self.total += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        }
        match outcome {
            EntryOutcome::CacheHit => self.cache_hits += 1,
            EntryOutcome::Downloaded => self.downloaded += 1,
            EntryOutcome::InlineWritten => self.inline_written += 1,
            EntryOutcome::NoCandidate => self.no_candidate += 1,
            EntryOutcome::PersistFailed => self.persist_failed += 1,
            EntryOutcome::Skipped => self.skipped += 1,
        }
        self.entry_results.push(EntryResult {
            name: name.to_string(),
            outcome,
        });
    }
}

/// Drives catalog entries through the enrichment state machine, one at a
/// time. Entries are never dropped; on any failure the existing image
/// reference is preserved verbatim.
pub struct Enricher<C: HttpClient> {
    client: C,
    store: ImageStore,
    delay: Duration,
    limit: Option<usize>,
}

impl<C: HttpClient> Enricher<C> {
    pub fn new(client: C, store: ImageStore, delay: Duration) -> Self {
        Self {
            client,
            store,
            delay,
            limit: None,
        }
    }

    /// Cap the number of entries enriched; entries beyond the cap pass
    /// through untouched.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Run the pipeline over the catalog, returning the updated entries
    /// and a run summary.
    pub async fn run(&self, mut entries: Vec<CatalogEntry>) -> (Vec<CatalogEntry>, RunSummary) {
        let total = self.limit.map_or(entries.len(), |l| l.min(entries.len()));
        let mut summary = RunSummary::default();

        for (idx, entry) in entries.iter_mut().take(total).enumerate() {
            tracing::info!("[{}/{}] processing {}", idx + 1, total, entry.name);

            let outcome = self.enrich_entry(entry).await;
            tracing::info!(name = %entry.name, outcome = outcome.as_str(), "entry done");
            summary.record(&entry.name, outcome);

            // Bound the outbound request rate.
            if outcome.touched_network() && idx + 1 < total {
                tokio::time::sleep(self.delay).await;
            }
        }

        (entries, summary)
    }

    /// Advance one entry through CHECK_CACHE → SEARCH → FETCH.
    async fn enrich_entry(&self, entry: &mut CatalogEntry) -> EntryOutcome {
        if entry.name.trim().is_empty() {
            tracing::warn!("skipping entry with empty name");
            return EntryOutcome::Skipped;
        }

        // CHECK_CACHE: an existing file short-circuits the network entirely.
        let target = self.store.resolve(&entry.name);
        if self.store.exists(&target) {
            tracing::debug!(path = %target.relative_url, "image already cached");
            entry.image = target.relative_url.clone();
            return EntryOutcome::CacheHit;
        }

        // SEARCH: build the query and scan the results page.
        let query = build_query(&entry.name);
        let url = search_url(&query);
        tracing::debug!(%query, "searching for image");

        let page = match self.client.fetch_html(&url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(name = %entry.name, error = %e, "image search failed");
                return EntryOutcome::NoCandidate;
            }
        };

        let candidates = extract_candidates(page.as_bytes());
        let Some(candidate) = candidates.into_iter().next() else {
            tracing::debug!(name = %entry.name, "no image candidates found");
            return EntryOutcome::NoCandidate;
        };

        // FETCH: persist the first candidate; failure leaves the entry untouched.
        match persist_candidate(&self.client, &candidate, &target).await {
            Ok(()) => {
                entry.image = target.relative_url.clone();
                match candidate {
                    ImageCandidate::Inline(_) => EntryOutcome::InlineWritten,
                    ImageCandidate::Remote(_) => EntryOutcome::Downloaded,
                }
            }
            Err(e) => {
                tracing::warn!(name = %entry.name, error = %e, "failed to persist image");
                EntryOutcome::PersistFailed
            }
        }
    }
}
