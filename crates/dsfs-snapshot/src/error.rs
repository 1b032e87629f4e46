//! Errors for capture, archive and restore operations.

use dsfs_core::ForestError;
use thiserror::Error;

/// Errors that can occur while archiving or restoring forests.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The reloaded records were internally inconsistent.
    #[error("Corrupt forest records: {0}")]
    Corrupt(#[from] ForestError),

    /// The recorded set count disagrees with the reconstructed forest.
    #[error("Recorded cardinality {recorded} does not match {counted} reconstructed sets")]
    CardinalityMismatch { recorded: u64, counted: u64 },

    /// The archive was written by an incompatible format version.
    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u8, actual: u8 },

    /// The archive payload does not hash to its recorded digest.
    #[error("Digest mismatch: expected {expected}, computed {computed}")]
    DigestMismatch { expected: String, computed: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("I/O error: {0}")]
    Io(String),
}
