//! Reload support: rebuilding elements from persisted records and the
//! relocation pass that repairs their links.
//!
//! Persisted records describe links in terms of the identities the
//! elements had when the forest was captured. Those identities mean
//! nothing in a freshly built arena, so reloaded elements arrive
//! link-less and carry their captured identities as [`StaleLink`]
//! baggage. A single [`patch`](DisjointSetForest::patch) pass maps
//! every captured identity to its new handle, rewrites the links and
//! throws the baggage away. Until that pass succeeds the forest must
//! not be handed to readers.

use crate::element::{Element, ElementId, StaleId, StaleLink};
use crate::error::ForestError;
use crate::forest::DisjointSetForest;
use std::collections::HashMap;

impl DisjointSetForest {
    /// Insert an element reconstructed from a persisted record.
    ///
    /// The element is placed without a link; `self_id` and `link_id`
    /// are kept on the side for the relocation pass. Rejects values
    /// already present and ranks below the data model's minimum, both
    /// of which mean the records are corrupt.
    pub fn insert_reloaded(
        &mut self,
        value: &[u8],
        rank: u32,
        self_id: StaleId,
        link_id: Option<StaleId>,
    ) -> Result<ElementId, ForestError> {
        if self.contains(value) {
            return Err(ForestError::DuplicateValue(value.into()));
        }
        if rank == 0 {
            return Err(ForestError::InvalidRank(value.into()));
        }
        let stale = StaleLink { self_id, link_id };
        let id = self.place(Element::reloaded(value.into(), rank, stale));
        self.index.insert(value.into(), id);
        Ok(id)
    }

    /// Resolve every stale link and discard the captured identities.
    ///
    /// Three passes over the forest: collect the captured identity of
    /// each reloaded element, rewrite each recorded link to the handle
    /// it maps to, then clear the identities and recount the sets.
    /// Identity collisions, links to identities nothing carries, and
    /// links that resolve back to their own element all mean the
    /// records are corrupt; the pass aborts and the caller must
    /// discard the forest rather than publish it.
    pub fn patch(&mut self) -> Result<(), ForestError> {
        let mut relocated: HashMap<StaleId, ElementId> =
            HashMap::with_capacity(self.live.len());
        for pos in 0..self.live.len() {
            let id = self.live[pos];
            if let Some(stale) = self.slot(id).stale {
                if relocated.insert(stale.self_id, id).is_some() {
                    return Err(ForestError::StaleIdCollision(stale.self_id));
                }
            }
        }
        for pos in 0..self.live.len() {
            let id = self.live[pos];
            let Some(stale) = self.slot(id).stale else {
                continue;
            };
            let Some(link_id) = stale.link_id else {
                continue;
            };
            match relocated.get(&link_id) {
                None => return Err(ForestError::UnresolvedStaleLink(link_id)),
                Some(&target) if target == id => {
                    return Err(ForestError::SelfReferentialLink(link_id));
                }
                Some(&target) => self.slot_mut(id).link = Some(target),
            }
        }
        let mut sets = 0;
        for pos in 0..self.live.len() {
            let id = self.live[pos];
            self.slot_mut(id).stale = None;
            if self.slot(id).link.is_none() {
                sets += 1;
            }
        }
        self.cardinality = sets;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::Comembership;

    fn sid(raw: u64) -> StaleId {
        StaleId::new(raw)
    }

    #[test]
    fn test_patch_restores_linkage() {
        // Records as if captured from {a, b, c} with b and c linked
        // under a, reloaded in a different order.
        let mut forest = DisjointSetForest::new();
        forest
            .insert_reloaded(b"c", 1, sid(12), Some(sid(10)))
            .unwrap();
        forest.insert_reloaded(b"a", 2, sid(10), None).unwrap();
        forest
            .insert_reloaded(b"b", 1, sid(11), Some(sid(10)))
            .unwrap();
        forest.patch().unwrap();

        assert_eq!(forest.len(), 3);
        assert_eq!(forest.cardinality(), 1);
        assert_eq!(forest.are_comembers(b"b", b"c"), Ok(Comembership::SameSet));
        let a = forest.id_of(b"a").unwrap();
        assert!(forest.element(a).unwrap().is_representative());
        assert_eq!(forest.element(a).unwrap().rank(), 2);
    }

    #[test]
    fn test_patch_counts_sets() {
        let mut forest = DisjointSetForest::new();
        forest.insert_reloaded(b"a", 2, sid(1), None).unwrap();
        forest
            .insert_reloaded(b"b", 1, sid(2), Some(sid(1)))
            .unwrap();
        forest.insert_reloaded(b"c", 1, sid(3), None).unwrap();
        forest.patch().unwrap();
        assert_eq!(forest.cardinality(), 2);
    }

    #[test]
    fn test_patch_clears_stale_identities() {
        let mut forest = DisjointSetForest::new();
        forest.insert_reloaded(b"a", 1, sid(1), None).unwrap();
        let id = forest.id_of(b"a").unwrap();
        assert!(forest.element(id).unwrap().stale().is_some());
        forest.patch().unwrap();
        assert!(forest.element(id).unwrap().stale().is_none());
    }

    #[test]
    fn test_patch_rejects_identity_collision() {
        let mut forest = DisjointSetForest::new();
        forest.insert_reloaded(b"a", 1, sid(5), None).unwrap();
        forest.insert_reloaded(b"b", 1, sid(5), None).unwrap();
        assert_eq!(forest.patch(), Err(ForestError::StaleIdCollision(sid(5))));
    }

    #[test]
    fn test_patch_rejects_dangling_link() {
        let mut forest = DisjointSetForest::new();
        forest.insert_reloaded(b"a", 1, sid(1), None).unwrap();
        forest
            .insert_reloaded(b"b", 1, sid(2), Some(sid(99)))
            .unwrap();
        assert_eq!(
            forest.patch(),
            Err(ForestError::UnresolvedStaleLink(sid(99)))
        );
    }

    #[test]
    fn test_patch_rejects_self_link() {
        let mut forest = DisjointSetForest::new();
        forest
            .insert_reloaded(b"a", 1, sid(1), Some(sid(1)))
            .unwrap();
        assert_eq!(forest.patch(), Err(ForestError::SelfReferentialLink(sid(1))));
    }

    #[test]
    fn test_insert_reloaded_rejects_corrupt_records() {
        let mut forest = DisjointSetForest::new();
        forest.insert_reloaded(b"a", 1, sid(1), None).unwrap();
        assert!(matches!(
            forest.insert_reloaded(b"a", 1, sid(2), None),
            Err(ForestError::DuplicateValue(_))
        ));
        assert!(matches!(
            forest.insert_reloaded(b"b", 0, sid(3), None),
            Err(ForestError::InvalidRank(_))
        ));
    }

    #[test]
    fn test_patched_forest_accepts_new_elements() {
        let mut forest = DisjointSetForest::new();
        forest.insert_reloaded(b"a", 2, sid(1), None).unwrap();
        forest
            .insert_reloaded(b"b", 1, sid(2), Some(sid(1)))
            .unwrap();
        forest.patch().unwrap();
        assert!(forest.add(b"c"));
        assert_eq!(forest.cardinality(), 2);
        forest.union(b"c", b"b").unwrap();
        assert_eq!(forest.cardinality(), 1);
    }
}
