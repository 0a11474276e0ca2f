//! Gradient cache semantics

use glint::gradient::GradientCache;
use glint::store::{GradientStore, SledGradientStore};
use glint::types::GradientRecord;
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> (sled::Db, SledGradientStore) {
    let db = sled::open(dir.path().join("store")).unwrap();
    let store = SledGradientStore::open(&db).unwrap();
    (db, store)
}

#[test]
fn test_fixed_record_never_recomputed() {
    let dir = TempDir::new().unwrap();
    let (_db, store) = open_store(&dir);
    store
        .put(&GradientRecord {
            tile_id: "t2".to_string(),
            left: "rgba(1,2,3,255)".to_string(),
            right: "rgba(4,5,6,255)".to_string(),
            fixed: true,
        })
        .unwrap();

    let cache = GradientCache::new(&store);
    // The icon path deliberately does not exist: if the extractor ran it
    // would produce the fallback pair, not the stored colors.
    let missing_icon = dir.path().join("missing.png");
    for _ in 0..3 {
        let pair = cache.get_or_compute("t2", &missing_icon, false);
        assert_eq!(pair.left, "rgba(1,2,3,255)");
        assert_eq!(pair.right, "rgba(4,5,6,255)");
    }
}

#[test]
fn test_explicit_background_pins_existing_record() {
    let dir = TempDir::new().unwrap();
    let (_db, store) = open_store(&dir);
    store
        .put(&GradientRecord {
            tile_id: "t3".to_string(),
            left: "rgba(7,8,9,255)".to_string(),
            right: "rgba(10,11,12,255)".to_string(),
            fixed: false,
        })
        .unwrap();

    let cache = GradientCache::new(&store);
    let pair = cache.get_or_compute("t3", &dir.path().join("missing.png"), true);
    assert_eq!(pair.left, "rgba(7,8,9,255)");
}

#[test]
fn test_existing_record_is_a_cache_hit() {
    let dir = TempDir::new().unwrap();
    let (_db, store) = open_store(&dir);
    store
        .put(&GradientRecord {
            tile_id: "t4".to_string(),
            left: "rgba(13,14,15,255)".to_string(),
            right: "rgba(16,17,18,255)".to_string(),
            fixed: false,
        })
        .unwrap();

    let cache = GradientCache::new(&store);
    // Neither fixed nor explicit background, but present: returned as-is.
    let pair = cache.get_or_compute("t4", &dir.path().join("missing.png"), false);
    assert_eq!(pair.left, "rgba(13,14,15,255)");
    assert_eq!(pair.right, "rgba(16,17,18,255)");
}

#[test]
fn test_miss_computes_and_persists_unfixed() {
    let dir = TempDir::new().unwrap();
    let (_db, store) = open_store(&dir);

    let icon = dir.path().join("icon.png");
    let image = image::RgbaImage::from_pixel(4, 4, image::Rgba([40, 80, 120, 255]));
    image.save(&icon).unwrap();

    let cache = GradientCache::new(&store);
    let pair = cache.get_or_compute("t5", &icon, false);
    assert_eq!(pair.left, "rgba(40,80,120,255)");

    let record = store.get("t5").unwrap().unwrap();
    assert_eq!(record.left, pair.left);
    assert_eq!(record.right, pair.right);
    assert!(!record.fixed);

    // Second call returns the persisted pair.
    let again = cache.get_or_compute("t5", &icon, false);
    assert_eq!(again, pair);
}
