//! Sled-backed attempt table

use crate::error::StorageError;
use crate::store::{AttemptStore, AGE_UNKNOWN};
use crate::types::{AttemptRecord, SourceKind};
use chrono::Utc;
use std::path::PathBuf;

const ATTEMPTS_TREE: &str = "attempts";

/// Sled-based implementation of [`AttemptStore`]
///
/// Records are keyed by href and serialized with bincode. Sled inserts are
/// atomic per key, so a concurrent reader sees either the old record or the
/// new one, never a partial write.
pub struct SledAttemptStore {
    tree: sled::Tree,
}

impl SledAttemptStore {
    /// Open the attempt tree inside an existing engine database.
    pub fn open(db: &sled::Db) -> Result<Self, StorageError> {
        let tree = db.open_tree(ATTEMPTS_TREE).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to open attempts tree: {}", e),
            ))
        })?;
        Ok(Self { tree })
    }

    /// Insert a fully-formed record, replacing any prior record for its href.
    ///
    /// `record_attempt` goes through here with `last_try = now`; tests use it
    /// directly to backdate records.
    pub fn put_record(&self, record: &AttemptRecord) -> Result<(), StorageError> {
        let value = bincode::serialize(record).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Failed to serialize attempt record: {}", e),
            ))
        })?;
        self.tree.insert(record.href.as_bytes(), value).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to put attempt record: {}", e),
            ))
        })?;
        Ok(())
    }
}

impl AttemptStore for SledAttemptStore {
    fn record_attempt(
        &self,
        href: &str,
        filepath: Option<PathBuf>,
        source: SourceKind,
    ) -> Result<(), StorageError> {
        self.put_record(&AttemptRecord {
            href: href.to_string(),
            last_try: Utc::now(),
            filepath,
            source,
        })
    }

    fn get(&self, href: &str) -> Result<Option<AttemptRecord>, StorageError> {
        match self.tree.get(href.as_bytes()).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to get attempt record: {}", e),
            ))
        })? {
            Some(value) => {
                let record: AttemptRecord = bincode::deserialize(&value).map_err(|e| {
                    StorageError::IoError(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("Failed to deserialize attempt record: {}", e),
                    ))
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn age_in_days(&self, href: &str) -> Result<i64, StorageError> {
        match self.get(href)? {
            Some(record) => Ok(record.age_in_days()),
            None => Ok(AGE_UNKNOWN),
        }
    }
}
