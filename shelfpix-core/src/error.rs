use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid response encoding: {0}")]
    InvalidEncoding(String),

    #[error("I/O error while downloading: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Catalog not found: {0}")]
    NotFound(String),

    #[error("Failed to read or write catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Download failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),
}
