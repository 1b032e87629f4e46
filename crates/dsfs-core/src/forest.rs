//! The disjoint-set forest engine.
//!
//! A forest partitions a set of byte-string values into disjoint
//! sets. Elements live in a stable arena and point at each other with
//! [`ElementId`] handles, so a link stays valid no matter how many
//! unrelated elements come and go around it. Union merges by rank,
//! lookups compress the paths they walk, and removal re-elects a
//! representative for whatever survives.

use crate::element::{Element, ElementId};
use crate::error::ForestError;
use rand::Rng;
use std::collections::HashMap;

/// Outcome of a union between two present values.
///
/// Asking to merge values that already share a set is a zero-effect
/// success, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnionOutcome {
    /// Two distinct sets became one.
    Merged,
    /// Both values already belonged to the same set; nothing changed.
    AlreadyUnified,
}

/// Answer to a co-membership query between two present values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comembership {
    SameSet,
    DifferentSets,
}

/// A disjoint-set forest over byte-string values.
///
/// Supports constant-amortized add, near-constant union and
/// co-membership queries, uniform random sampling, and linear-time
/// set materialization and removal. Values are unique within a
/// forest; adding a present value is a no-op.
#[derive(Clone, Debug)]
pub struct DisjointSetForest {
    /// Stable arena. Links index into it and survive unrelated
    /// removals; vacated slots are recycled through `free`.
    pub(crate) slots: Vec<Option<Element>>,
    /// Slots vacated by removals, available for reuse.
    pub(crate) free: Vec<ElementId>,
    /// Value to owning slot.
    pub(crate) index: HashMap<Box<[u8]>, ElementId>,
    /// Dense roster of occupied slots, for scans and random picks.
    pub(crate) live: Vec<ElementId>,
    /// Number of disjoint sets, maintained incrementally.
    pub(crate) cardinality: usize,
}

impl DisjointSetForest {
    pub fn new() -> Self {
        DisjointSetForest {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            live: Vec::new(),
            cardinality: 0,
        }
    }

    /// Number of elements in the forest.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Number of disjoint sets. Equals [`len`](Self::len) exactly when
    /// every element is a singleton.
    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

    pub fn contains(&self, value: &[u8]) -> bool {
        self.index.contains_key(value)
    }

    /// Handle of the element owning `value`, if present.
    pub fn id_of(&self, value: &[u8]) -> Option<ElementId> {
        self.index.get(value).copied()
    }

    /// The element behind a handle, if the slot is occupied.
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.slots.get(id.slot()).and_then(|slot| slot.as_ref())
    }

    /// Add `value` as a new singleton set.
    ///
    /// Returns `true` if the value was inserted and `false` if it was
    /// already present, in which case the forest is untouched.
    pub fn add(&mut self, value: &[u8]) -> bool {
        if self.index.contains_key(value) {
            return false;
        }
        let id = self.place(Element::singleton(value.into()));
        self.index.insert(value.into(), id);
        self.cardinality += 1;
        true
    }

    /// Merge the sets containing `a` and `b`.
    ///
    /// The lower-rank representative is linked under the higher-rank
    /// one; on a tie the surviving representative's rank grows by one.
    /// Both values must be present.
    pub fn union(&mut self, a: &[u8], b: &[u8]) -> Result<UnionOutcome, ForestError> {
        let elem_a = self.require(a)?;
        let elem_b = self.require(b)?;
        let root_a = self.find(elem_a);
        let root_b = self.find(elem_b);
        if root_a == root_b {
            return Ok(UnionOutcome::AlreadyUnified);
        }
        let rank_a = self.slot(root_a).rank;
        let rank_b = self.slot(root_b).rank;
        if rank_a < rank_b {
            self.slot_mut(root_a).link = Some(root_b);
        } else if rank_b < rank_a {
            self.slot_mut(root_b).link = Some(root_a);
        } else {
            // Tie: either direction works, but the survivor gets deeper.
            self.slot_mut(root_b).link = Some(root_a);
            self.slot_mut(root_a).rank += 1;
        }
        self.cardinality -= 1;
        Ok(UnionOutcome::Merged)
    }

    /// Whether `a` and `b` belong to the same set.
    ///
    /// Both values must be present; a missing value is reported as
    /// [`ForestError::NotFound`], never conflated with
    /// [`Comembership::DifferentSets`].
    pub fn are_comembers(&mut self, a: &[u8], b: &[u8]) -> Result<Comembership, ForestError> {
        let elem_a = self.require(a)?;
        let elem_b = self.require(b)?;
        if self.find(elem_a) == self.find(elem_b) {
            Ok(Comembership::SameSet)
        } else {
            Ok(Comembership::DifferentSets)
        }
    }

    /// Every value in the set containing `value`, the queried value
    /// included. Scans the whole forest; member order is unspecified.
    pub fn members_of(&mut self, value: &[u8]) -> Result<Vec<Vec<u8>>, ForestError> {
        let target = self.require(value)?;
        let root = self.find(target);
        let mut members = Vec::new();
        for pos in 0..self.live.len() {
            let id = self.live[pos];
            if self.find(id) == root {
                members.push(self.slot(id).value.to_vec());
            }
        }
        Ok(members)
    }

    /// Remove `value` from the forest.
    ///
    /// If the value shared its set with other elements, the first
    /// co-member found in roster order becomes the new representative
    /// and every other survivor is linked directly beneath it. The
    /// set count only drops when the removed element was a singleton.
    /// Removal scans the whole forest; it is not what the structure
    /// is optimized for.
    pub fn remove(&mut self, value: &[u8]) -> Result<(), ForestError> {
        let doomed = self.require(value)?;
        let root = self.find(doomed);
        let mut survivors = Vec::new();
        for pos in 0..self.live.len() {
            let id = self.live[pos];
            if id != doomed && self.find(id) == root {
                survivors.push(id);
            }
        }
        if let Some((&new_root, rest)) = survivors.split_first() {
            // The compression above pointed every survivor at `root`,
            // which may be the element on its way out. Re-elect and
            // flatten the set beneath the new representative.
            self.slot_mut(new_root).link = None;
            self.slot_mut(new_root).rank = if survivors.len() > 2 { 2 } else { 1 };
            for &id in rest {
                self.slot_mut(id).link = Some(new_root);
            }
        } else {
            self.cardinality -= 1;
        }
        self.evict(doomed);
        Ok(())
    }

    /// A uniformly random element value, or `None` on an empty forest.
    pub fn random_element<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&[u8]> {
        if self.live.is_empty() {
            return None;
        }
        let id = self.live[rng.gen_range(0..self.live.len())];
        Some(self.slot(id).value())
    }

    /// Iterate the element values in roster order.
    pub fn values(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.live.iter().map(move |&id| self.slot(id).value())
    }

    /// Iterate handles and elements in roster order.
    pub fn entries(&self) -> impl Iterator<Item = (ElementId, &Element)> + '_ {
        self.live.iter().map(move |&id| (id, self.slot(id)))
    }

    /// Resolve the representative of the set containing `start`.
    ///
    /// Two passes: walk the link chain to its terminal element, then
    /// point every element on the walked path straight at it. The
    /// second pass never changes which element is the representative
    /// and leaves every rank untouched.
    pub(crate) fn find(&mut self, start: ElementId) -> ElementId {
        let mut root = start;
        let mut hops = 0;
        while let Some(next) = self.slot(root).link {
            root = next;
            hops += 1;
            assert!(
                hops < self.slots.len(),
                "element link chain does not terminate"
            );
        }
        let mut cursor = start;
        while let Some(next) = self.slot(cursor).link {
            self.slot_mut(cursor).link = Some(root);
            cursor = next;
        }
        root
    }

    /// Put an element into a vacant slot, growing the arena if none is
    /// free, and register it in the live roster. The value index is
    /// the caller's responsibility.
    pub(crate) fn place(&mut self, mut element: Element) -> ElementId {
        element.live_at = self.live.len() as u32;
        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id.slot()] = Some(element);
                id
            }
            None => {
                self.slots.push(Some(element));
                ElementId::from_slot(self.slots.len() - 1)
            }
        };
        self.live.push(id);
        id
    }

    /// Drop an element from the arena, the live roster and the value
    /// index, recycling its slot.
    fn evict(&mut self, id: ElementId) {
        let element = self.slots[id.slot()]
            .take()
            .expect("evicting a vacant slot");
        self.index.remove(element.value());
        let pos = element.live_at as usize;
        self.live.swap_remove(pos);
        if pos < self.live.len() {
            let moved = self.live[pos];
            self.slot_mut(moved).live_at = pos as u32;
        }
        self.free.push(id);
    }

    pub(crate) fn require(&self, value: &[u8]) -> Result<ElementId, ForestError> {
        self.id_of(value).ok_or_else(|| ForestError::not_found(value))
    }

    pub(crate) fn slot(&self, id: ElementId) -> &Element {
        self.slots[id.slot()].as_ref().expect("vacant element slot")
    }

    pub(crate) fn slot_mut(&mut self, id: ElementId) -> &mut Element {
        self.slots[id.slot()].as_mut().expect("vacant element slot")
    }
}

impl Default for DisjointSetForest {
    fn default() -> Self {
        Self::new()
    }
}
