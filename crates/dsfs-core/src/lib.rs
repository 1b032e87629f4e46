//! # dsfs-core
//!
//! Disjoint-set forest engine for Coppice (Disjoint-Set Forest Store).
//!
//! This crate provides:
//! - A union-find structure over byte-string values with union by rank
//!   and path compression
//! - A stable element arena whose handles survive unrelated removals
//! - Removal with representative re-election for the surviving set
//! - Uniform random element sampling
//! - A relocation pass that repairs link identities after a reload
//!
//! ## Example
//!
//! ```rust
//! use dsfs_core::{Comembership, DisjointSetForest, UnionOutcome};
//!
//! let mut forest = DisjointSetForest::new();
//! forest.add(b"ash");
//! forest.add(b"birch");
//! forest.add(b"cedar");
//!
//! assert_eq!(forest.union(b"ash", b"birch"), Ok(UnionOutcome::Merged));
//! assert_eq!(forest.are_comembers(b"ash", b"birch"), Ok(Comembership::SameSet));
//! assert_eq!(
//!     forest.are_comembers(b"ash", b"cedar"),
//!     Ok(Comembership::DifferentSets)
//! );
//!
//! // Three elements, two disjoint sets.
//! assert_eq!(forest.len(), 3);
//! assert_eq!(forest.cardinality(), 2);
//! ```

mod element;
mod error;
mod forest;
mod patch;

pub use element::{Element, ElementId, StaleId, StaleLink};
pub use error::ForestError;
pub use forest::{Comembership, DisjointSetForest, UnionOutcome};
