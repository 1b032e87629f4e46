//! Versioned, digest-verified archives of whole keyspaces.
//!
//! An archive wraps the serialized forest records of every key behind
//! a format version and a SHA-256 digest. Opening verifies both
//! before any record is deserialized, so byte-level corruption is
//! caught ahead of the logical checks the restore pass runs.

use crate::error::SnapshotError;
use crate::record::ForestRecord;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Current archive format version.
pub const ARCHIVE_VERSION: u8 = 1;

/// A 32-byte SHA-256 digest over an archive payload.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArchiveDigest([u8; 32]);

impl ArchiveDigest {
    /// Create a digest from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        ArchiveDigest(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Digest a payload directly.
    pub fn compute(payload: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(payload);
        let result = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&result);
        ArchiveDigest(bytes)
    }

    /// Convert to hex string for display.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Truncated display (first 8 chars).
    pub fn short(&self) -> String {
        self.to_hex()[..8].to_string()
    }
}

impl fmt::Debug for ArchiveDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArchiveDigest({}...)", &self.to_hex()[..8])
    }
}

impl fmt::Display for ArchiveDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Every forest of a keyspace, sealed at one point in time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Archive {
    /// Format version for compatibility.
    pub version: u8,

    /// Timestamp when the archive was sealed.
    pub created_at: u64,

    /// Digest of the payload, verified on open.
    pub digest: ArchiveDigest,

    /// The serialized forest records, keyed by store key.
    pub payload: Vec<u8>,
}

impl Archive {
    /// Seal captured forest records into an archive.
    pub fn seal(forests: &BTreeMap<String, ForestRecord>) -> Result<Self, SnapshotError> {
        let payload = serde_json::to_vec(forests)
            .map_err(|e| SnapshotError::SerializationError(e.to_string()))?;
        let digest = ArchiveDigest::compute(&payload);
        let created_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Ok(Archive {
            version: ARCHIVE_VERSION,
            created_at,
            digest,
            payload,
        })
    }

    /// Verify the archive and unpack its forest records.
    ///
    /// The version and digest checks run before anything inside the
    /// payload is trusted.
    pub fn open(&self) -> Result<BTreeMap<String, ForestRecord>, SnapshotError> {
        if self.version != ARCHIVE_VERSION {
            return Err(SnapshotError::VersionMismatch {
                expected: ARCHIVE_VERSION,
                actual: self.version,
            });
        }
        let computed = ArchiveDigest::compute(&self.payload);
        if computed != self.digest {
            return Err(SnapshotError::DigestMismatch {
                expected: self.digest.to_hex(),
                computed: computed.to_hex(),
            });
        }
        serde_json::from_slice(&self.payload)
            .map_err(|e| SnapshotError::SerializationError(e.to_string()))
    }

    /// Write the archive to a file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let bytes = serde_json::to_vec(self)
            .map_err(|e| SnapshotError::SerializationError(e.to_string()))?;
        fs::write(path, bytes).map_err(|e| SnapshotError::Io(e.to_string()))
    }

    /// Read an archive back from a file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let bytes = fs::read(path).map_err(|e| SnapshotError::Io(e.to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| SnapshotError::SerializationError(e.to_string()))
    }

    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.payload.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{capture, restore};
    use dsfs_core::{Comembership, DisjointSetForest};

    fn sample_records() -> BTreeMap<String, ForestRecord> {
        let mut forest = DisjointSetForest::new();
        forest.add(b"a");
        forest.add(b"b");
        forest.union(b"a", b"b").unwrap();
        let mut records = BTreeMap::new();
        records.insert("groups".to_string(), capture(&forest));
        records
    }

    #[test]
    fn test_digest_deterministic() {
        let d1 = ArchiveDigest::compute(b"hello world");
        let d2 = ArchiveDigest::compute(b"hello world");
        assert_eq!(d1, d2);
        assert_ne!(d1, ArchiveDigest::compute(b"hello"));
    }

    #[test]
    fn test_digest_hex_length() {
        let digest = ArchiveDigest::compute(b"payload");
        assert_eq!(digest.to_hex().len(), 64);
        assert_eq!(digest.short().len(), 8);
    }

    #[test]
    fn test_seal_and_open() {
        let records = sample_records();
        let archive = Archive::seal(&records).unwrap();
        assert_eq!(archive.version, ARCHIVE_VERSION);
        assert_eq!(archive.open().unwrap(), records);
    }

    #[test]
    fn test_open_rejects_tampered_payload() {
        let records = sample_records();
        let mut archive = Archive::seal(&records).unwrap();
        let last = archive.payload.len() - 1;
        archive.payload[last] ^= 0xff;
        assert!(matches!(
            archive.open(),
            Err(SnapshotError::DigestMismatch { .. })
        ));
    }

    #[test]
    fn test_open_rejects_unknown_version() {
        let records = sample_records();
        let mut archive = Archive::seal(&records).unwrap();
        archive.version = ARCHIVE_VERSION + 1;
        assert!(matches!(
            archive.open(),
            Err(SnapshotError::VersionMismatch { expected: 1, actual: 2 })
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let records = sample_records();
        let archive = Archive::seal(&records).unwrap();
        let path = std::env::temp_dir().join(format!(
            "coppice-archive-roundtrip-{}.json",
            std::process::id()
        ));
        archive.save_to_file(&path).unwrap();
        let loaded = Archive::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.digest, archive.digest);
        let unpacked = loaded.open().unwrap();
        let mut forest = restore(&unpacked["groups"]).unwrap();
        assert_eq!(forest.are_comembers(b"a", b"b"), Ok(Comembership::SameSet));
    }
}
