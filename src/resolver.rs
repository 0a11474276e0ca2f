//! Per-tile resource resolution
//!
//! The resolver owns the fallback chain that decides where a tile's icon
//! comes from: manual override, managed cache, suppressed retry, live
//! fetch. Every reachable-but-failing network condition is converted into
//! attempt-table state; nothing propagates to the rendering layer.

use crate::artifact::ArtifactStore;
use crate::config::GlintConfig;
use crate::error::EngineError;
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::gradient::GradientCache;
use crate::metadata::{extract_icon_candidate, resolve_candidate_url, IconCandidate};
use crate::store::{AttemptStore, SledAttemptStore, SledGradientStore};
use crate::types::{SourceKind, Tile, TileResources};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Resolves icons and gradients for dashboard tiles.
///
/// One resolver is shared across renders; its stores are safe for
/// concurrent per-key upserts and the in-flight set keeps two racing
/// renders from fetching the same href twice.
pub struct ResourceResolver {
    artifacts: ArtifactStore,
    attempts: SledAttemptStore,
    gradients: SledGradientStore,
    fetcher: Arc<dyn PageFetcher>,
    retry_suppression_days: i64,
    inflight: Mutex<HashSet<String>>,
    db: Option<sled::Db>,
}

impl ResourceResolver {
    pub fn new(
        artifacts: ArtifactStore,
        attempts: SledAttemptStore,
        gradients: SledGradientStore,
        fetcher: Arc<dyn PageFetcher>,
        retry_suppression_days: i64,
    ) -> Self {
        Self {
            artifacts,
            attempts,
            gradients,
            fetcher,
            retry_suppression_days,
            inflight: Mutex::new(HashSet::new()),
            db: None,
        }
    }

    /// Build a resolver with the real HTTP fetcher and sled-backed stores
    /// from engine configuration.
    pub fn from_config(config: &GlintConfig) -> Result<Self, EngineError> {
        let db = sled::open(&config.store_path).map_err(|e| {
            EngineError::ConfigError(format!(
                "Failed to open engine store at {:?}: {}",
                config.store_path, e
            ))
        })?;
        let attempts = SledAttemptStore::open(&db)?;
        let gradients = SledGradientStore::open(&db)?;
        let artifacts = ArtifactStore::new(&config.override_dir, &config.cache_dir)?;
        let fetcher = HttpFetcher::new(
            &config.user_agent,
            Duration::from_secs(config.fetch_timeout_secs),
        )
        .map_err(|e| EngineError::ConfigError(e.to_string()))?;

        let mut resolver = Self::new(
            artifacts,
            attempts,
            gradients,
            Arc::new(fetcher),
            config.retry_suppression_days,
        );
        resolver.db = Some(db);
        Ok(resolver)
    }

    /// Resolve everything the renderer needs for one tile: the icon path
    /// (if any source yields one) and the gradient pair derived from it.
    pub async fn resolve_tile(&self, tile: &Tile) -> TileResources {
        let icon = self.resolve_icon(tile).await;
        let gradient = icon.as_ref().map(|path| {
            GradientCache::new(&self.gradients).get_or_compute(
                &tile.id,
                path,
                tile.background.is_some(),
            )
        });
        TileResources { icon, gradient }
    }

    /// Resolve a tile's icon through the fallback chain, stopping at the
    /// first match:
    ///
    /// 1. manual override file (no network, no cache read)
    /// 2. managed cache file (no network)
    /// 3. failed attempt younger than the suppression window (skip)
    /// 4. live fetch, recording the outcome either way
    pub async fn resolve_icon(&self, tile: &Tile) -> Option<PathBuf> {
        if let Some(path) = self.artifacts.override_path(&tile.id) {
            debug!(tile = %tile.id, "using manual override icon");
            return Some(path);
        }
        if let Some(path) = self.artifacts.cached_path(&tile.id) {
            debug!(tile = %tile.id, "using cached icon");
            return Some(path);
        }

        let href = tile.effective_href();
        if self.is_suppressed(href) {
            debug!(tile = %tile.id, href, "previous attempt failed recently, skipping fetch");
            return None;
        }

        let Some(_guard) = InflightGuard::try_acquire(&self.inflight, href) else {
            debug!(tile = %tile.id, href, "fetch already in flight, skipping this pass");
            return None;
        };
        self.live_fetch(tile, href).await
    }

    /// Whether the last attempt against `href` failed within the
    /// suppression window. Only failed attempts suppress; a successful
    /// attempt whose cache file has since vanished retries immediately.
    fn is_suppressed(&self, href: &str) -> bool {
        let record = match self.attempts.get(href) {
            Ok(record) => record,
            Err(e) => {
                warn!(href, error = %e, "attempt store read failed, proceeding to fetch");
                return false;
            }
        };
        match record {
            Some(record) if record.filepath.is_none() => {
                let age = record.age_in_days();
                age >= 0 && age < self.retry_suppression_days
            }
            _ => false,
        }
    }

    /// Step 4 of the chain: fetch the page, locate an icon candidate,
    /// fetch the image, cache it and record the attempt. Any failure along
    /// the way records a failed attempt and yields no icon.
    async fn live_fetch(&self, tile: &Tile, href: &str) -> Option<PathBuf> {
        let page = match self.fetcher.fetch(href).await {
            Ok(page) => page,
            Err(e) => {
                info!(tile = %tile.id, href, error = %e, "page fetch failed");
                self.record_failure(href);
                return None;
            }
        };

        let Some(candidate) = extract_icon_candidate(&page) else {
            info!(tile = %tile.id, href, "no og:image or rel-icon tag found");
            self.record_failure(href);
            return None;
        };
        let kind = match candidate {
            IconCandidate::OgImage(_) => SourceKind::Og,
            IconCandidate::RelIcon(_) => SourceKind::RelIcon,
        };

        let Some(image_url) = resolve_candidate_url(href, candidate.url()) else {
            info!(tile = %tile.id, href, candidate = candidate.url(), "candidate URL not resolvable");
            self.record_failure(href);
            return None;
        };

        let bytes = match self.fetcher.fetch(&image_url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                info!(tile = %tile.id, url = %image_url, error = %e, "image fetch failed");
                self.record_failure(href);
                return None;
            }
        };

        match self.artifacts.write(&tile.id, &bytes) {
            Ok(path) => {
                info!(tile = %tile.id, source = kind.label(), "icon cached");
                self.record_attempt(href, Some(path.clone()), kind);
                Some(path)
            }
            Err(e) => {
                // Non-fatal per tile: the fetch succeeded, so record it with
                // its would-be path; the missing cache file triggers a
                // refetch next pass.
                warn!(tile = %tile.id, error = %e, "failed to cache icon artifact");
                self.record_attempt(href, Some(self.artifacts.cache_slot(&tile.id)), kind);
                None
            }
        }
    }

    fn record_failure(&self, href: &str) {
        self.record_attempt(href, None, SourceKind::None);
    }

    fn record_attempt(&self, href: &str, filepath: Option<PathBuf>, source: SourceKind) {
        if let Err(e) = self.attempts.record_attempt(href, filepath, source) {
            warn!(href, error = %e, "failed to record attempt");
        }
    }

    /// Direct access to the attempt table, for callers inspecting engine
    /// state.
    pub fn attempts(&self) -> &SledAttemptStore {
        &self.attempts
    }

    /// Direct access to the gradient table.
    pub fn gradients(&self) -> &SledGradientStore {
        &self.gradients
    }

    /// Flush pending store writes to disk.
    pub fn flush(&self) -> Result<(), EngineError> {
        if let Some(db) = &self.db {
            db.flush().map_err(|e| {
                EngineError::ConfigError(format!("Failed to flush engine store: {}", e))
            })?;
        }
        Ok(())
    }
}

/// Removes its href from the in-flight set on drop.
struct InflightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    href: String,
}

impl<'a> InflightGuard<'a> {
    fn try_acquire(set: &'a Mutex<HashSet<String>>, href: &str) -> Option<Self> {
        if set.lock().insert(href.to_string()) {
            Some(Self {
                set,
                href: href.to_string(),
            })
        } else {
            None
        }
    }
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.href);
    }
}
