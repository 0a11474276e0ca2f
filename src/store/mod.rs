//! Persisted engine state
//!
//! Two independent keyed tables back the resolution engine: the attempt
//! table (one record per source href, gating retry suppression) and the
//! gradient table (one record per tile). Both live as sled trees inside a
//! single database, with bincode-serialized record values.

pub mod attempts;
pub mod gradients;

pub use attempts::SledAttemptStore;
pub use gradients::SledGradientStore;

use crate::error::StorageError;
use crate::types::{AttemptRecord, GradientRecord, SourceKind};
use std::path::PathBuf;

/// Sentinel returned by [`AttemptStore::age_in_days`] when no record exists,
/// meaning "unknown, proceed to fetch".
pub const AGE_UNKNOWN: i64 = -1;

/// Attempt table interface
///
/// At most one record per href; `record_attempt` always replaces the prior
/// record for that href. Records are never deleted by the engine.
pub trait AttemptStore {
    /// Upsert the attempt record for `href` with the current timestamp.
    fn record_attempt(
        &self,
        href: &str,
        filepath: Option<PathBuf>,
        source: SourceKind,
    ) -> Result<(), StorageError>;

    fn get(&self, href: &str) -> Result<Option<AttemptRecord>, StorageError>;

    /// Whole days elapsed since the last attempt against `href`, or
    /// [`AGE_UNKNOWN`] when no attempt has been recorded.
    fn age_in_days(&self, href: &str) -> Result<i64, StorageError>;
}

/// Gradient table interface
pub trait GradientStore {
    fn get(&self, tile_id: &str) -> Result<Option<GradientRecord>, StorageError>;
    fn put(&self, record: &GradientRecord) -> Result<(), StorageError>;
}
