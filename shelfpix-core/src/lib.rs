pub mod cache;
pub mod catalog;
pub mod error;
pub mod extract;
pub mod http;
pub mod persist;
pub mod query;
pub mod runner;

pub use cache::{sanitize_name, ImageStore, LocalImage};
pub use catalog::{load_catalog, save_catalog, CatalogEntry};
pub use error::{FetchError, PersistError, StoreError};
pub use extract::{extract_candidates, ImageCandidate};
pub use http::{HttpClient, MockClient, MockResponse, WebClient, WebClientBuilder};
pub use persist::persist_candidate;
pub use query::{build_query, search_url};
pub use runner::{Enricher, EntryOutcome, EntryResult, RunSummary, RunnerConfig};
