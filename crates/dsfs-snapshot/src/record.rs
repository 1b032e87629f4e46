//! Persisted form of forests and their elements.
//!
//! A captured element names its link partner by the identity the
//! partner had at capture time, never by a live handle. Restoring
//! therefore runs in two stages: every record is placed back into a
//! fresh arena, then the forest's relocation pass rewrites the
//! recorded identities into live handles. A forest is only handed
//! back once both stages and the cardinality cross-check succeed.

use crate::error::SnapshotError;
use dsfs_core::{DisjointSetForest, StaleId};
use serde::{Deserialize, Serialize};

/// Persisted form of one element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRecord {
    /// The element's byte-string value.
    pub value: Vec<u8>,

    /// The identity the element had when captured.
    pub self_id: StaleId,

    /// The captured identity of its link partner, absent for
    /// representatives.
    pub link_id: Option<StaleId>,

    /// The element's rank at capture time.
    pub rank: u32,
}

/// Persisted form of one forest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestRecord {
    /// Set count at capture time, cross-checked on restore.
    pub cardinality: u64,

    /// The elements, in no particular order.
    pub elements: Vec<ElementRecord>,
}

/// Capture a forest as persistable records.
///
/// The live handles become the records' captured identities; ranks
/// and links are taken as they are, compressed or not.
pub fn capture(forest: &DisjointSetForest) -> ForestRecord {
    let elements = forest
        .entries()
        .map(|(id, element)| ElementRecord {
            value: element.value().to_vec(),
            self_id: StaleId::from(id),
            link_id: element.link().map(StaleId::from),
            rank: element.rank(),
        })
        .collect();
    ForestRecord {
        cardinality: forest.cardinality() as u64,
        elements,
    }
}

/// Rebuild a live forest from captured records.
///
/// Fails without returning a forest if the records are internally
/// inconsistent or the recorded cardinality disagrees with what was
/// reconstructed, so readers can never observe a half-repaired
/// forest.
pub fn restore(record: &ForestRecord) -> Result<DisjointSetForest, SnapshotError> {
    let mut forest = DisjointSetForest::new();
    for element in &record.elements {
        forest.insert_reloaded(&element.value, element.rank, element.self_id, element.link_id)?;
    }
    forest.patch()?;
    let counted = forest.cardinality() as u64;
    if counted != record.cardinality {
        return Err(SnapshotError::CardinalityMismatch {
            recorded: record.cardinality,
            counted,
        });
    }
    Ok(forest)
}
