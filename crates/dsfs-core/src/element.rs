//! Elements of a disjoint-set forest and the identities they carry.
//!
//! An element is addressed two ways: by its byte-string value (the
//! logical identity, unique within a forest) and by an [`ElementId`]
//! (the physical identity, a slot in the owning forest's arena).
//! Physical identities are stable while the element lives but do not
//! survive persistence; [`StaleId`] preserves them across a reload so
//! the relocation pass can stitch links back together.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to an element's slot in its owning forest.
///
/// Handles stay valid for the lifetime of the element: insertions and
/// removals of other elements never move it. A handle is meaningless
/// outside the forest that issued it and must not be kept across a
/// removal or a reload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

impl ElementId {
    pub(crate) fn from_slot(slot: usize) -> Self {
        ElementId(slot as u32)
    }

    /// Slot index inside the owning forest's arena.
    pub fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The physical identity an element had when its forest was captured.
///
/// Opaque beyond equality and ordering. Snapshot records carry one per
/// element; after a reload the relocation pass maps them back to live
/// handles and discards them. A stale identity is single-use and never
/// observable through the query surface.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StaleId(u64);

impl StaleId {
    pub const fn new(raw: u64) -> Self {
        StaleId(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<ElementId> for StaleId {
    fn from(id: ElementId) -> Self {
        StaleId(id.0 as u64)
    }
}

impl fmt::Display for StaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identities a freshly reloaded element carries until the relocation
/// pass resolves its link against the rest of the reloaded forest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaleLink {
    /// The identity this element had in the captured forest.
    pub self_id: StaleId,
    /// The captured identity of the element it linked to, if any.
    pub link_id: Option<StaleId>,
}

/// One element of a disjoint-set forest.
///
/// Carries the byte-string value, the link toward the set's
/// representative (`None` for the representative itself) and the rank
/// hint that steers union direction.
#[derive(Clone, Debug)]
pub struct Element {
    pub(crate) value: Box<[u8]>,
    pub(crate) link: Option<ElementId>,
    pub(crate) rank: u32,
    pub(crate) stale: Option<StaleLink>,
    /// Position in the forest's live roster; maintained by the forest.
    pub(crate) live_at: u32,
}

impl Element {
    pub(crate) fn singleton(value: Box<[u8]>) -> Self {
        Element {
            value,
            link: None,
            rank: 1,
            stale: None,
            live_at: 0,
        }
    }

    pub(crate) fn reloaded(value: Box<[u8]>, rank: u32, stale: StaleLink) -> Self {
        Element {
            value,
            link: None,
            rank,
            stale: Some(stale),
            live_at: 0,
        }
    }

    /// The logical identity of this element, unique within its forest.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Link toward the set's representative. `None` means this element
    /// is the representative.
    pub fn link(&self) -> Option<ElementId> {
        self.link
    }

    /// Depth heuristic used to pick the surviving root during a union.
    /// Only meaningful while the element is a representative.
    pub fn rank(&self) -> u32 {
        self.rank
    }

    pub fn is_representative(&self) -> bool {
        self.link.is_none()
    }

    /// Stale identities awaiting relocation, present only between a
    /// reload and the patch pass that consumes them.
    pub fn stale(&self) -> Option<StaleLink> {
        self.stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_id_preserves_element_id() {
        let id = ElementId::from_slot(42);
        assert_eq!(StaleId::from(id).get(), 42);
    }

    #[test]
    fn test_stale_id_serialization() {
        let id = StaleId::new(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");
        let back: StaleId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_singleton_starts_as_representative() {
        let element = Element::singleton(b"oak".to_vec().into_boxed_slice());
        assert!(element.is_representative());
        assert_eq!(element.rank(), 1);
        assert_eq!(element.value(), b"oak");
        assert!(element.stale().is_none());
    }
}
