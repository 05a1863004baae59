//! Local image cache resolution.
//!
//! A product name maps deterministically to one file under the image
//! directory. Existence of that file is the entire cache policy: once a
//! file occupies the resolved path, no further network activity happens
//! for that name, whatever the file's contents.

use std::path::{Path, PathBuf};

/// Characters that never appear in a sanitized key.
const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Maximum sanitized key length.
const MAX_KEY_LEN: usize = 80;

/// Cached files are always stored as .jpg, whatever the source format.
const IMAGE_EXT: &str = "jpg";

/// Resolved local location for a product image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    /// Public URL written back into the catalog, e.g. "/images/Red_Apple_1kg.jpg".
    pub relative_url: String,
    /// Filesystem path the image is stored at.
    pub fs_path: PathBuf,
}

/// Derive a filesystem-safe key from a product name.
///
/// Stable across runs: reserved characters and spaces map to underscores,
/// runs of underscores collapse, leading/trailing underscores are
/// trimmed, and the result is capped at 80 characters.
pub fn sanitize_name(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    for c in name.chars() {
        let mapped = if RESERVED.contains(&c) || c == ' ' {
            '_'
        } else {
            c
        };
        if mapped == '_' && key.ends_with('_') {
            continue;
        }
        key.push(mapped);
    }

    let key: String = key.trim_matches('_').chars().take(MAX_KEY_LEN).collect();
    // Truncation can re-expose a trailing separator.
    key.trim_end_matches('_').to_string()
}

/// Maps product names to canonical local image locations.
#[derive(Debug, Clone)]
pub struct ImageStore {
    images_dir: PathBuf,
    url_prefix: String,
}

impl ImageStore {
    /// Create a store over an image directory. `url_prefix` is the public
    /// path prefix written into the catalog (e.g. "/images").
    pub fn new(images_dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        let url_prefix = url_prefix.into();
        Self {
            images_dir: images_dir.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Directory images are stored in.
    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Resolve the canonical local location for a product name.
    /// Pure and total; performs no I/O.
    pub fn resolve(&self, name: &str) -> LocalImage {
        let filename = format!("{}.{}", sanitize_name(name), IMAGE_EXT);
        LocalImage {
            relative_url: format!("{}/{}", self.url_prefix, filename),
            fs_path: self.images_dir.join(filename),
        }
    }

    /// Whether an image already occupies the resolved path. Existence
    /// only; contents are never validated.
    pub fn exists(&self, image: &LocalImage) -> bool {
        image.fs_path.exists()
    }
}
