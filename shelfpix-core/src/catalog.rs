//! Catalog store: a JSON array of product entries on disk.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;

/// One product in the catalog. Fields other than `name` and `image` are
/// opaque to the pipeline and round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Load the catalog wholesale. A missing or malformed file is fatal.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>, StoreError> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            StoreError::NotFound(path.display().to_string())
        } else {
            StoreError::Io(e)
        }
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Persist the catalog wholesale.
///
/// Writes to a temporary sibling file and renames it into place so the
/// store never holds a partially written document.
pub fn save_catalog(path: &Path, entries: &[CatalogEntry]) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(entries)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
