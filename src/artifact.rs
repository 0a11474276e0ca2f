//! Icon artifact storage
//!
//! Filesystem-backed store of resolved icon bytes, keyed by tile identifier.
//! Two directories participate: a manual-override directory the engine only
//! ever reads (highest priority), and a managed cache directory the engine
//! owns exclusively.

use crate::error::StorageError;
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem artifact store for tile icons
///
/// Layout:
/// - `{override_dir}/{tile_id}.png` — read-only, never written here
/// - `{cache_dir}/{tile_id}.png` — read/write, engine-owned
pub struct ArtifactStore {
    override_dir: PathBuf,
    cache_dir: PathBuf,
}

impl ArtifactStore {
    /// Create an artifact store over the given directories.
    ///
    /// The cache directory is created if missing; the override directory is
    /// left alone since it is operator-managed and may legitimately not
    /// exist.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        override_dir: P,
        cache_dir: Q,
    ) -> Result<Self, StorageError> {
        let cache_dir = cache_dir.as_ref().to_path_buf();
        fs::create_dir_all(&cache_dir).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to create icon cache directory {:?}: {}", cache_dir, e),
            ))
        })?;
        Ok(Self {
            override_dir: override_dir.as_ref().to_path_buf(),
            cache_dir,
        })
    }

    /// Path of the manual override file for a tile, if one exists.
    pub fn override_path(&self, tile_id: &str) -> Option<PathBuf> {
        let path = self.override_dir.join(format!("{}.png", tile_id));
        path.is_file().then_some(path)
    }

    /// Path of the cached artifact for a tile, if one exists.
    pub fn cached_path(&self, tile_id: &str) -> Option<PathBuf> {
        let path = self.cache_dir.join(format!("{}.png", tile_id));
        path.is_file().then_some(path)
    }

    /// Where the cached artifact for a tile lives, whether or not the file
    /// exists yet.
    pub fn cache_slot(&self, tile_id: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.png", tile_id))
    }

    /// Write icon bytes into the managed cache for a tile.
    ///
    /// Uses atomic writes (write to .tmp, then rename) so a concurrent
    /// reader never observes a partially written artifact.
    pub fn write(&self, tile_id: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.cache_slot(tile_id);
        let temp_path = path.with_extension("png.tmp");

        fs::write(&temp_path, bytes).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to write icon artifact {:?}: {}", temp_path, e),
            ))
        })?;
        fs::rename(&temp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to finalize icon artifact {:?}: {}", path, e),
            ))
        })?;

        Ok(path)
    }
}
