//! Error types for the store layer.

use dsfs_core::ForestError;
use dsfs_snapshot::SnapshotError;
use thiserror::Error;

/// Errors that can occur in keyspace operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Forest error: {0}")]
    Forest(ForestError),

    #[error("Snapshot error: {0}")]
    Snapshot(SnapshotError),
}

impl From<ForestError> for StoreError {
    fn from(err: ForestError) -> Self {
        StoreError::Forest(err)
    }
}

impl From<SnapshotError> for StoreError {
    fn from(err: SnapshotError) -> Self {
        StoreError::Snapshot(err)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
