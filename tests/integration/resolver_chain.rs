//! End-to-end tests for the icon fallback chain

use super::test_utils::{engine, png_bytes, tile};
use glint::store::{AttemptStore, GradientStore};
use glint::types::SourceKind;
use std::fs;

#[tokio::test]
async fn test_og_image_end_to_end() {
    let env = engine();
    env.fetcher.serve(
        "https://site.test/",
        br#"<html><head><meta property="og:image" content="https://site.test/img.png"></head></html>"#.to_vec(),
    );
    env.fetcher.serve("https://site.test/img.png", png_bytes(10, 20, 30));

    let tile = tile("t1", "https://site.test/");
    let icon = env.resolver.resolve_icon(&tile).await.unwrap();

    assert!(icon.starts_with(env.dir.path().join("cache")));
    assert_eq!(fs::read(&icon).unwrap(), png_bytes(10, 20, 30));

    let record = env.resolver.attempts().get("https://site.test/").unwrap().unwrap();
    assert_eq!(record.source, SourceKind::Og);
    assert_eq!(record.filepath, Some(icon));
}

#[tokio::test]
async fn test_rel_icon_fallback_with_relative_href() {
    let env = engine();
    env.fetcher.serve(
        "https://site.test/app",
        br#"<html><head><link rel="shortcut icon" href="/static/favicon.png"></head></html>"#
            .to_vec(),
    );
    env.fetcher
        .serve("https://site.test/static/favicon.png", png_bytes(1, 2, 3));

    let tile = tile("t2", "https://site.test/app");
    let icon = env.resolver.resolve_icon(&tile).await;

    assert!(icon.is_some());
    let record = env
        .resolver
        .attempts()
        .get("https://site.test/app")
        .unwrap()
        .unwrap();
    assert_eq!(record.source, SourceKind::RelIcon);
}

#[tokio::test]
async fn test_cached_artifact_short_circuits_second_call() {
    let env = engine();
    env.fetcher.serve(
        "https://site.test/",
        br#"<meta property="og:image" content="https://site.test/img.png">"#.to_vec(),
    );
    env.fetcher.serve("https://site.test/img.png", png_bytes(5, 5, 5));
    let tile = tile("t1", "https://site.test/");

    let first = env.resolver.resolve_icon(&tile).await.unwrap();
    let fetches_after_first = env.fetcher.call_count();
    assert_eq!(fetches_after_first, 2); // page + image

    let second = env.resolver.resolve_icon(&tile).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(env.fetcher.call_count(), fetches_after_first);
}

#[tokio::test]
async fn test_page_without_metadata_records_failure() {
    let env = engine();
    env.fetcher
        .serve("https://plain.test/", b"<html><body>nothing here</body></html>".to_vec());

    let tile = tile("t3", "https://plain.test/");
    assert!(env.resolver.resolve_icon(&tile).await.is_none());

    let record = env.resolver.attempts().get("https://plain.test/").unwrap().unwrap();
    assert_eq!(record.source, SourceKind::None);
    assert!(record.filepath.is_none());
}

#[tokio::test]
async fn test_unreachable_image_records_failure() {
    let env = engine();
    // Page resolves but the advertised image 404s.
    env.fetcher.serve(
        "https://site.test/",
        br#"<meta property="og:image" content="https://site.test/gone.png">"#.to_vec(),
    );

    let tile = tile("t4", "https://site.test/");
    assert!(env.resolver.resolve_icon(&tile).await.is_none());

    let record = env.resolver.attempts().get("https://site.test/").unwrap().unwrap();
    assert!(record.filepath.is_none());
    assert_eq!(record.source, SourceKind::None);
}

#[tokio::test]
async fn test_cache_write_failure_records_attempt_without_icon() {
    let env = engine();
    env.fetcher.serve(
        "https://site.test/",
        br#"<meta property="og:image" content="https://site.test/img.png">"#.to_vec(),
    );
    env.fetcher.serve("https://site.test/img.png", png_bytes(5, 6, 7));
    // A directory squatting on the cache slot makes the finalizing rename
    // fail after the fetch has already succeeded.
    fs::create_dir_all(env.dir.path().join("cache/t7.png")).unwrap();

    let tile = tile("t7", "https://site.test/");
    assert!(env.resolver.resolve_icon(&tile).await.is_none());

    // The fetch outcome is still recorded, path and kind included, so the
    // missing cache file triggers a refetch next pass instead of a 30-day
    // suppression.
    let record = env.resolver.attempts().get("https://site.test/").unwrap().unwrap();
    assert_eq!(record.source, SourceKind::Og);
    assert_eq!(record.filepath, Some(env.dir.path().join("cache/t7.png")));
}

#[tokio::test]
async fn test_resolve_tile_attaches_gradient() {
    let env = engine();
    env.fetcher.serve(
        "https://site.test/",
        br#"<meta property="og:image" content="https://site.test/img.png">"#.to_vec(),
    );
    env.fetcher
        .serve("https://site.test/img.png", png_bytes(40, 80, 120));

    let tile = tile("t5", "https://site.test/");
    let resources = env.resolver.resolve_tile(&tile).await;

    assert!(resources.icon.is_some());
    let gradient = resources.gradient.unwrap();
    // Uniform icon: left is the probe color, right a brightened variant.
    assert_eq!(gradient.left, "rgba(40,80,120,255)");
    assert!(gradient.right.starts_with("rgba("));

    // The pair is persisted for the next render.
    let record = env.resolver.gradients().get("t5").unwrap().unwrap();
    assert_eq!(record.left, gradient.left);
    assert!(!record.fixed);
}

#[tokio::test]
async fn test_tile_without_icon_gets_no_gradient() {
    let env = engine();
    let tile = tile("t6", "https://down.test/");
    let resources = env.resolver.resolve_tile(&tile).await;
    assert!(resources.icon.is_none());
    assert!(resources.gradient.is_none());
}
