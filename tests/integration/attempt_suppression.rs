//! Retry-suppression window behavior

use super::test_utils::{engine, png_bytes, tile};
use chrono::{Duration, Utc};
use glint::store::AttemptStore;
use glint::types::{AttemptRecord, SourceKind};
use std::path::PathBuf;

#[tokio::test]
async fn test_recent_failure_suppresses_fetch() {
    let env = engine();
    env.resolver
        .attempts()
        .put_record(&AttemptRecord {
            href: "https://site.test/".to_string(),
            last_try: Utc::now() - Duration::days(5),
            filepath: None,
            source: SourceKind::None,
        })
        .unwrap();

    let tile = tile("t1", "https://site.test/");
    assert!(env.resolver.resolve_icon(&tile).await.is_none());
    assert_eq!(env.fetcher.call_count(), 0);
}

#[tokio::test]
async fn test_expired_failure_retries() {
    let env = engine();
    env.resolver
        .attempts()
        .put_record(&AttemptRecord {
            href: "https://site.test/".to_string(),
            last_try: Utc::now() - Duration::days(30),
            filepath: None,
            source: SourceKind::None,
        })
        .unwrap();
    env.fetcher.serve(
        "https://site.test/",
        br#"<meta property="og:image" content="https://site.test/img.png">"#.to_vec(),
    );
    env.fetcher.serve("https://site.test/img.png", png_bytes(9, 9, 9));

    let tile = tile("t1", "https://site.test/");
    let icon = env.resolver.resolve_icon(&tile).await;

    assert!(icon.is_some(), "a failure exactly 30 days old must not suppress");
    assert_eq!(env.fetcher.call_count(), 2);
    // The stale failure record was replaced by the success.
    let record = env.resolver.attempts().get("https://site.test/").unwrap().unwrap();
    assert_eq!(record.source, SourceKind::Og);
}

#[tokio::test]
async fn test_successful_attempt_with_deleted_cache_retries_immediately() {
    let env = engine();
    // A fresh successful record, but the cache file it points at is gone.
    env.resolver
        .attempts()
        .put_record(&AttemptRecord {
            href: "https://site.test/".to_string(),
            last_try: Utc::now(),
            filepath: Some(PathBuf::from("/gone/t1.png")),
            source: SourceKind::Og,
        })
        .unwrap();
    env.fetcher.serve(
        "https://site.test/",
        br#"<meta property="og:image" content="https://site.test/img.png">"#.to_vec(),
    );
    env.fetcher.serve("https://site.test/img.png", png_bytes(7, 7, 7));

    let tile = tile("t1", "https://site.test/");
    let icon = env.resolver.resolve_icon(&tile).await;

    assert!(icon.is_some(), "only failed attempts are suppressed");
    assert!(env.fetcher.call_count() > 0);
}

#[test]
fn test_age_in_days_contract() {
    use glint::store::AGE_UNKNOWN;

    let env = engine();
    let attempts = env.resolver.attempts();

    assert_eq!(attempts.age_in_days("https://new.test/").unwrap(), AGE_UNKNOWN);

    attempts
        .record_attempt("https://new.test/", None, SourceKind::None)
        .unwrap();
    assert_eq!(attempts.age_in_days("https://new.test/").unwrap(), 0);
}
