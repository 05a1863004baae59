//! Candidate image extraction from fetched page content.
//!
//! The page is treated as a weak grammar: a pass over image-bearing
//! attributes, then a pass over embedded script text. Candidates are
//! deduplicated by their full representation, first occurrence winning.

use std::collections::HashSet;
use std::sync::LazyLock;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use regex::Regex;
use scraper::{Html, Selector};

/// Image URL pattern for script payloads.
static SCRIPT_IMAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https://[^"\s]+\.(?:jpg|jpeg|png|webp)"#).expect("Invalid script image regex")
});

static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("Invalid img selector"));

static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("Invalid script selector"));

/// Recognized image file extensions.
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp"];

/// A located image reference, not yet verified as downloadable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageCandidate {
    /// An absolute URL to fetch.
    Remote(String),
    /// Decoded inline image bytes; no further fetch is needed or possible.
    Inline(Vec<u8>),
}

/// Extract candidate images from fetched page content.
///
/// Two passes: image-bearing attributes (remote URLs and inline base64
/// payloads, in document order), then embedded script text. If the markup
/// passes find nothing, degrades to pattern-matching over the raw text.
/// Never fails; unusable content yields an empty sequence.
pub fn extract_candidates(content: &[u8]) -> Vec<ImageCandidate> {
    let text = String::from_utf8_lossy(content);
    let document = Html::parse_document(&text);

    let mut candidates = Vec::new();
    scan_image_attributes(&document, &mut candidates);
    scan_script_text(&document, &mut candidates);

    if candidates.is_empty() {
        // Markup yielded nothing: pattern-match the raw text.
        for m in SCRIPT_IMAGE_REGEX.find_iter(&text) {
            candidates.push(ImageCandidate::Remote(m.as_str().to_string()));
        }
    }

    dedup_preserving_order(candidates)
}

/// Scan `img` elements for remote URLs and inline base64 payloads.
fn scan_image_attributes(document: &Html, out: &mut Vec<ImageCandidate>) {
    for element in document.select(&IMG_SELECTOR) {
        let src = element
            .value()
            .attr("src")
            .or_else(|| element.value().attr("data-src"));
        let Some(src) = src else {
            continue;
        };

        if src.starts_with("http") && has_image_extension(src) {
            out.push(ImageCandidate::Remote(src.to_string()));
        } else if src.starts_with("data:image") {
            if let Some(bytes) = decode_inline_payload(src) {
                out.push(ImageCandidate::Inline(bytes));
            }
        }
    }
}

/// Scan embedded script payloads for image URL substrings.
fn scan_script_text(document: &Html, out: &mut Vec<ImageCandidate>) {
    for element in document.select(&SCRIPT_SELECTOR) {
        let script: String = element.text().collect();
        for m in SCRIPT_IMAGE_REGEX.find_iter(&script) {
            out.push(ImageCandidate::Remote(m.as_str().to_string()));
        }
    }
}

/// Decode a `data:image/...;base64,` payload. Returns None for anything
/// not well-formed.
fn decode_inline_payload(src: &str) -> Option<Vec<u8>> {
    let (header, payload) = src.split_once(',')?;
    if !header.ends_with(";base64") {
        return None;
    }
    match BASE64.decode(payload.trim()) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::debug!(error = %e, "skipping undecodable inline image");
            None
        }
    }
}

/// True if the URL path ends in a recognized image extension, ignoring
/// any query string or fragment.
fn has_image_extension(url: &str) -> bool {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(*ext))
}

/// Order-preserving dedup over the full candidate representation.
fn dedup_preserving_order(candidates: Vec<ImageCandidate>) -> Vec<ImageCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.clone()))
        .collect()
}
