//! Error types for forest operations.

use crate::element::StaleId;
use thiserror::Error;

/// Errors surfaced by forest operations and by the post-reload
/// relocation pass.
///
/// Absence of a referenced value is an ordinary error value, not a
/// panic. The stale-link variants indicate corrupt reloaded records
/// and abort the reload that produced them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForestError {
    /// The operation referenced a value that is not in the forest.
    #[error("No such element: {}", String::from_utf8_lossy(.0))]
    NotFound(Box<[u8]>),

    /// A reloaded record claimed a value that is already present.
    #[error("Duplicate value in reloaded records: {}", String::from_utf8_lossy(.0))]
    DuplicateValue(Box<[u8]>),

    /// A reloaded record carried a rank below the data model's minimum.
    #[error("Reloaded record for {} has rank 0", String::from_utf8_lossy(.0))]
    InvalidRank(Box<[u8]>),

    /// Two reloaded elements carried the same captured identity.
    #[error("Stale identity {0} appears more than once")]
    StaleIdCollision(StaleId),

    /// A reloaded link referenced a captured identity that no reloaded
    /// element carries.
    #[error("Stale link {0} does not resolve to any reloaded element")]
    UnresolvedStaleLink(StaleId),

    /// A reloaded link resolved back to the element that carries it.
    #[error("Stale link {0} resolves to its own element")]
    SelfReferentialLink(StaleId),
}

impl ForestError {
    pub fn not_found(value: &[u8]) -> Self {
        ForestError::NotFound(value.into())
    }
}
