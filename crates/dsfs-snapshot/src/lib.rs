//! # dsfs-snapshot
//!
//! Persistence layer for Coppice (Disjoint-Set Forest Store).
//!
//! This crate provides:
//! - Capture of live forests into link-by-identity records
//! - Restore with a relocation pass and corruption checks
//! - Versioned, SHA-256 verified archives of whole keyspaces
//! - Archive file I/O
//!
//! ## Example
//!
//! ```rust
//! use dsfs_core::{Comembership, DisjointSetForest};
//! use dsfs_snapshot::{capture, restore};
//!
//! let mut forest = DisjointSetForest::new();
//! forest.add(b"ash");
//! forest.add(b"birch");
//! forest.union(b"ash", b"birch").unwrap();
//!
//! let record = capture(&forest);
//! let mut reloaded = restore(&record).unwrap();
//! assert_eq!(
//!     reloaded.are_comembers(b"ash", b"birch"),
//!     Ok(Comembership::SameSet)
//! );
//! ```

mod archive;
mod error;
mod record;

pub use archive::{Archive, ArchiveDigest, ARCHIVE_VERSION};
pub use error::SnapshotError;
pub use record::{capture, restore, ElementRecord, ForestRecord};
