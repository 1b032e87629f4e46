//! # dsfs-store
//!
//! Keyed store surface for Coppice (Disjoint-Set Forest Store).
//!
//! This crate provides:
//! - A keyspace mapping string keys to disjoint-set forests
//! - Command-shaped operations with create-on-write and
//!   delete-on-empty key lifecycle
//! - Change events and a dirty counter driving the snapshot policy
//! - Whole-keyspace archiving with all-or-nothing reload
//!
//! ## Example
//!
//! ```rust
//! use dsfs_core::Comembership;
//! use dsfs_store::Keyspace;
//!
//! let mut ks = Keyspace::new();
//! ks.add("trees", ["ash", "birch", "cedar"]);
//! ks.union("trees", b"ash", b"birch").unwrap();
//!
//! assert_eq!(ks.element_count("trees"), 3);
//! assert_eq!(ks.cardinality("trees"), 2);
//! assert!(matches!(
//!     ks.are_comembers("trees", b"ash", b"birch"),
//!     Ok(Comembership::SameSet)
//! ));
//! ```

mod error;
mod keyspace;

pub use error::{Result, StoreError};
pub use keyspace::{Keyspace, KeyspaceEvent, SnapshotPolicy};

pub use dsfs_core::{Comembership, DisjointSetForest, ForestError, UnionOutcome};
pub use dsfs_snapshot::{Archive, SnapshotError};
