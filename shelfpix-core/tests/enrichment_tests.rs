//! End-to-end enrichment scenarios against a mock HTTP client.

use std::fs;
use std::time::Duration;

use serde_json::Map;
use tempfile::TempDir;

use shelfpix_core::{build_query, search_url, CatalogEntry, Enricher, ImageStore, MockClient};

fn entry(name: &str, image: &str) -> CatalogEntry {
    CatalogEntry {
        name: name.to_string(),
        image: image.to_string(),
        extra: Map::new(),
    }
}

/// The search page URL the runner will request for a product name.
fn search_page_for(name: &str) -> String {
    search_url(&build_query(name))
}

#[tokio::test]
async fn test_download_success_rewrites_entry() {
    let dir = TempDir::new().unwrap();
    let client = MockClient::new()
        .with_page(
            &search_page_for("Red Apple 1kg"),
            r#"<img src="https://x.test/img.jpg">"#,
        )
        .with_file("https://x.test/img.jpg", b"jpegdata".to_vec());

    let enricher = Enricher::new(
        &client,
        ImageStore::new(dir.path(), "/images"),
        Duration::ZERO,
    );
    let (entries, summary) = enricher
        .run(vec![entry("Red Apple 1kg", "http://old.example/a.jpg")])
        .await;

    assert_eq!(entries[0].image, "/images/Red_Apple_1kg.jpg");
    let saved = dir.path().join("Red_Apple_1kg.jpg");
    assert!(saved.exists());
    assert!(!fs::read(&saved).unwrap().is_empty());
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.downloaded, 1);
}

#[tokio::test]
async fn test_download_failure_preserves_entry() {
    let dir = TempDir::new().unwrap();
    let client = MockClient::new()
        .with_page(
            &search_page_for("Red Apple 1kg"),
            r#"<img src="https://x.test/img.jpg">"#,
        )
        .with_error("https://x.test/img.jpg", "HTTP 404");

    let enricher = Enricher::new(
        &client,
        ImageStore::new(dir.path(), "/images"),
        Duration::ZERO,
    );
    let (entries, summary) = enricher
        .run(vec![entry("Red Apple 1kg", "http://old.example/a.jpg")])
        .await;

    assert_eq!(entries[0].image, "http://old.example/a.jpg");
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.persist_failed, 1);
}

#[tokio::test]
async fn test_cache_hit_makes_no_network_calls() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Red_Apple_1kg.jpg"), b"cached").unwrap();

    // No responses configured: any request would fail the run.
    let client = MockClient::new();
    let enricher = Enricher::new(
        &client,
        ImageStore::new(dir.path(), "/images"),
        Duration::ZERO,
    );
    let (entries, summary) = enricher
        .run(vec![entry("Red Apple 1kg", "http://old.example/a.jpg")])
        .await;

    assert_eq!(entries[0].image, "/images/Red_Apple_1kg.jpg");
    assert!(client.requests().is_empty());
    assert_eq!(summary.cache_hits, 1);
}

#[tokio::test]
async fn test_inline_candidate_wins_without_remote_fetch() {
    let dir = TempDir::new().unwrap();
    // Inline payload appears before the remote URL; "hello" base64-encoded.
    let page = concat!(
        r#"<img src="data:image/png;base64,aGVsbG8=">"#,
        r#"<img src="https://x.test/late.jpg">"#,
    );
    let client = MockClient::new().with_page(&search_page_for("Gouda"), page);

    let enricher = Enricher::new(
        &client,
        ImageStore::new(dir.path(), "/images"),
        Duration::ZERO,
    );
    let (entries, summary) = enricher.run(vec![entry("Gouda", "")]).await;

    assert_eq!(entries[0].image, "/images/Gouda.jpg");
    assert_eq!(fs::read(dir.path().join("Gouda.jpg")).unwrap(), b"hello");
    assert_eq!(summary.inline_written, 1);
    // Only the search page was requested; the remote URL never was.
    assert_eq!(client.requests(), vec![search_page_for("Gouda")]);
}

#[tokio::test]
async fn test_no_candidates_preserves_entry() {
    let dir = TempDir::new().unwrap();
    let client =
        MockClient::new().with_page(&search_page_for("Obscure Item"), "<html><body>nothing</body></html>");

    let enricher = Enricher::new(
        &client,
        ImageStore::new(dir.path(), "/images"),
        Duration::ZERO,
    );
    let (entries, summary) = enricher
        .run(vec![entry("Obscure Item", "http://old.example/o.jpg")])
        .await;

    assert_eq!(entries[0].image, "http://old.example/o.jpg");
    assert_eq!(summary.no_candidate, 1);
}

#[tokio::test]
async fn test_search_failure_preserves_entry() {
    let dir = TempDir::new().unwrap();
    let client = MockClient::new().with_error(&search_page_for("Obscure Item"), "timed out");

    let enricher = Enricher::new(
        &client,
        ImageStore::new(dir.path(), "/images"),
        Duration::ZERO,
    );
    let (entries, summary) = enricher
        .run(vec![entry("Obscure Item", "http://old.example/o.jpg")])
        .await;

    assert_eq!(entries[0].image, "http://old.example/o.jpg");
    assert_eq!(summary.no_candidate, 1);
}

#[tokio::test]
async fn test_second_run_is_all_cache_hits() {
    let dir = TempDir::new().unwrap();
    let client = MockClient::new()
        .with_page(
            &search_page_for("Red Apple 1kg"),
            r#"<img src="https://x.test/img.jpg">"#,
        )
        .with_file("https://x.test/img.jpg", b"jpegdata".to_vec());

    let store = ImageStore::new(dir.path(), "/images");
    let enricher = Enricher::new(&client, store.clone(), Duration::ZERO);
    let (entries, _) = enricher
        .run(vec![entry("Red Apple 1kg", "http://old.example/a.jpg")])
        .await;
    assert_eq!(client.requests().len(), 2);

    // Second run over the updated catalog: no further network activity.
    let second_client = MockClient::new();
    let enricher = Enricher::new(&second_client, store, Duration::ZERO);
    let (entries, summary) = enricher.run(entries).await;

    assert!(second_client.requests().is_empty());
    assert_eq!(entries[0].image, "/images/Red_Apple_1kg.jpg");
    assert_eq!(summary.cache_hits, 1);
}

#[tokio::test]
async fn test_entry_with_existing_local_image_is_unchanged() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Red_Apple_1kg.jpg"), b"cached").unwrap();

    let client = MockClient::new();
    let enricher = Enricher::new(
        &client,
        ImageStore::new(dir.path(), "/images"),
        Duration::ZERO,
    );
    let before = entry("Red Apple 1kg", "/images/Red_Apple_1kg.jpg");
    let (entries, _) = enricher.run(vec![before.clone()]).await;

    assert_eq!(entries[0], before);
}

#[tokio::test]
async fn test_empty_name_is_skipped_untouched() {
    let dir = TempDir::new().unwrap();
    let client = MockClient::new();
    let enricher = Enricher::new(
        &client,
        ImageStore::new(dir.path(), "/images"),
        Duration::ZERO,
    );
    let (entries, summary) = enricher
        .run(vec![entry("  ", "http://old.example/a.jpg")])
        .await;

    assert_eq!(entries[0].image, "http://old.example/a.jpg");
    assert_eq!(summary.skipped, 1);
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn test_limit_passes_remaining_entries_through() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("First.jpg"), b"cached").unwrap();

    let client = MockClient::new();
    let enricher = Enricher::new(
        &client,
        ImageStore::new(dir.path(), "/images"),
        Duration::ZERO,
    )
    .with_limit(Some(1));
    let (entries, summary) = enricher
        .run(vec![
            entry("First", ""),
            entry("Second", "http://old.example/s.jpg"),
        ])
        .await;

    assert_eq!(summary.total, 1);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].image, "http://old.example/s.jpg");
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn test_all_entries_are_kept_in_order() {
    let dir = TempDir::new().unwrap();
    let client = MockClient::new()
        .with_page(
            &search_page_for("Alpha"),
            r#"<img src="https://x.test/a.jpg">"#,
        )
        .with_file("https://x.test/a.jpg", b"a".to_vec())
        .with_error(&search_page_for("Beta"), "HTTP 500")
        .with_page(&search_page_for("Gamma"), "<html></html>");

    let enricher = Enricher::new(
        &client,
        ImageStore::new(dir.path(), "/images"),
        Duration::ZERO,
    );
    let (entries, summary) = enricher
        .run(vec![
            entry("Alpha", "http://old.example/1.jpg"),
            entry("Beta", "http://old.example/2.jpg"),
            entry("Gamma", "http://old.example/3.jpg"),
        ])
        .await;

    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);
    assert_eq!(entries[0].image, "/images/Alpha.jpg");
    assert_eq!(entries[1].image, "http://old.example/2.jpg");
    assert_eq!(entries[2].image, "http://old.example/3.jpg");
    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 1);
}
