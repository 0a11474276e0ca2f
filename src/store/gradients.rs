//! Sled-backed gradient table

use crate::error::StorageError;
use crate::store::GradientStore;
use crate::types::GradientRecord;

const GRADIENTS_TREE: &str = "gradients";

/// Sled-based implementation of [`GradientStore`], keyed by tile id.
pub struct SledGradientStore {
    tree: sled::Tree,
}

impl SledGradientStore {
    /// Open the gradient tree inside an existing engine database.
    pub fn open(db: &sled::Db) -> Result<Self, StorageError> {
        let tree = db.open_tree(GRADIENTS_TREE).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to open gradients tree: {}", e),
            ))
        })?;
        Ok(Self { tree })
    }
}

impl GradientStore for SledGradientStore {
    fn get(&self, tile_id: &str) -> Result<Option<GradientRecord>, StorageError> {
        match self.tree.get(tile_id.as_bytes()).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to get gradient record: {}", e),
            ))
        })? {
            Some(value) => {
                let record: GradientRecord = bincode::deserialize(&value).map_err(|e| {
                    StorageError::IoError(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("Failed to deserialize gradient record: {}", e),
                    ))
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn put(&self, record: &GradientRecord) -> Result<(), StorageError> {
        let value = bincode::serialize(record).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Failed to serialize gradient record: {}", e),
            ))
        })?;
        self.tree.insert(record.tile_id.as_bytes(), value).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to put gradient record: {}", e),
            ))
        })?;
        Ok(())
    }
}
