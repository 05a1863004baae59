//! Search query construction for product names.

use url::Url;

/// Fixed suffix appended to every query to bias results toward grocery
/// product imagery.
pub const QUERY_SUFFIX: &str = "product food grocery";

const SEARCH_ENDPOINT: &str = "https://www.google.com/search";

/// Build the search query for a product name. Deterministic and pure;
/// callers must not pass an empty name.
pub fn build_query(name: &str) -> String {
    format!("{} {}", name.trim(), QUERY_SUFFIX)
}

/// Build the image-search URL for a query.
pub fn search_url(query: &str) -> String {
    let mut url = Url::parse(SEARCH_ENDPOINT).expect("Invalid search endpoint");
    url.query_pairs_mut()
        .append_pair("q", query)
        .append_pair("tbm", "isch")
        .append_pair("hl", "en");
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_appends_suffix() {
        assert_eq!(build_query("Red Apple 1kg"), "Red Apple 1kg product food grocery");
    }

    #[test]
    fn test_build_query_trims_name() {
        assert_eq!(build_query("  Milk  "), "Milk product food grocery");
    }

    #[test]
    fn test_search_url_encodes_query() {
        let url = search_url("Red Apple 1kg product food grocery");
        assert!(url.starts_with("https://www.google.com/search?"));
        assert!(url.contains("q=Red+Apple+1kg+product+food+grocery"));
        assert!(url.contains("tbm=isch"));
        assert!(url.contains("hl=en"));
    }

    #[test]
    fn test_search_url_is_deterministic() {
        let query = build_query("Olive Oil 500ml");
        assert_eq!(search_url(&query), search_url(&query));
    }
}
