//! The keyed store surface: forests addressed by string keys.
//!
//! A keyspace owns any number of forests and exposes them through
//! discrete commands. Keys come into being on first write and vanish
//! when their last element does; a key that does not exist reads
//! exactly like an empty forest. Every effective write bumps a dirty
//! counter and pushes an event, which is how the snapshot policy and
//! the surrounding machinery observe the store.

use crate::error::{Result, StoreError};
use dsfs_core::{Comembership, DisjointSetForest, ForestError, UnionOutcome};
use dsfs_snapshot::{capture, restore, Archive, ForestRecord};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A change to the keyspace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyspaceEvent {
    /// Elements were added under a key.
    ElementsAdded { key: String, count: usize },

    /// Elements were removed from under a key.
    ElementsRemoved { key: String, count: usize },

    /// Two sets under a key became one.
    SetsMerged { key: String },

    /// A key lost its forest, either by emptying out or by deletion.
    KeyDeleted { key: String },
}

/// When a keyspace is due for a snapshot.
#[derive(Clone, Debug)]
pub struct SnapshotPolicy {
    /// Effective writes accumulated since the last save before a
    /// snapshot is due.
    pub dirty_threshold: u64,
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        SnapshotPolicy {
            dirty_threshold: 1000,
        }
    }
}

/// A collection of disjoint-set forests addressed by string keys.
#[derive(Clone, Debug)]
pub struct Keyspace {
    /// The live forests. No key ever maps to an empty forest.
    forests: BTreeMap<String, DisjointSetForest>,

    /// Snapshot due-ness configuration.
    policy: SnapshotPolicy,

    /// Effective writes since the last save.
    dirty: u64,

    /// Pending events for the surrounding machinery.
    pending_events: Vec<KeyspaceEvent>,
}

impl Keyspace {
    /// Create an empty keyspace with the default snapshot policy.
    pub fn new() -> Self {
        Keyspace {
            forests: BTreeMap::new(),
            policy: SnapshotPolicy::default(),
            dirty: 0,
            pending_events: Vec::new(),
        }
    }

    /// Create an empty keyspace with a custom snapshot policy.
    pub fn with_policy(policy: SnapshotPolicy) -> Self {
        Keyspace {
            forests: BTreeMap::new(),
            policy,
            dirty: 0,
            pending_events: Vec::new(),
        }
    }

    /// Get the snapshot policy.
    pub fn policy(&self) -> &SnapshotPolicy {
        &self.policy
    }

    /// Add values under `key` as new singleton sets.
    ///
    /// The key is created if it does not exist. Values already present
    /// are left alone. Returns how many values were actually inserted.
    pub fn add<I, V>(&mut self, key: &str, values: I) -> usize
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        let values: Vec<V> = values.into_iter().collect();
        if values.is_empty() {
            return 0;
        }
        let forest = self.forest_or_create(key);
        let mut added = 0;
        for value in &values {
            if forest.add(value.as_ref()) {
                added += 1;
            }
        }
        if added > 0 {
            self.dirty += added as u64;
            self.pending_events.push(KeyspaceEvent::ElementsAdded {
                key: key.to_string(),
                count: added,
            });
        }
        added
    }

    /// Remove values from under `key`.
    ///
    /// Values not present count for nothing; a missing key removes
    /// nothing. The key is dropped when its last element goes.
    /// Returns how many values were actually removed.
    pub fn remove<I, V>(&mut self, key: &str, values: I) -> usize
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        let Some(forest) = self.forest_mut(key) else {
            return 0;
        };
        let mut removed = 0;
        for value in values {
            if forest.remove(value.as_ref()).is_ok() {
                removed += 1;
            }
        }
        let emptied = forest.is_empty();
        if removed > 0 {
            self.dirty += removed as u64;
            self.pending_events.push(KeyspaceEvent::ElementsRemoved {
                key: key.to_string(),
                count: removed,
            });
        }
        if emptied {
            self.forests.remove(key);
            self.pending_events.push(KeyspaceEvent::KeyDeleted {
                key: key.to_string(),
            });
        }
        removed
    }

    /// Merge the sets containing `a` and `b` under `key`.
    pub fn union(&mut self, key: &str, a: &[u8], b: &[u8]) -> Result<UnionOutcome> {
        let Some(forest) = self.forest_mut(key) else {
            return Err(StoreError::Forest(ForestError::not_found(a)));
        };
        let outcome = forest.union(a, b)?;
        if outcome == UnionOutcome::Merged {
            self.dirty += 1;
            self.pending_events.push(KeyspaceEvent::SetsMerged {
                key: key.to_string(),
            });
        }
        Ok(outcome)
    }

    /// Whether `a` and `b` share a set under `key`.
    pub fn are_comembers(&mut self, key: &str, a: &[u8], b: &[u8]) -> Result<Comembership> {
        let Some(forest) = self.forest_mut(key) else {
            return Err(StoreError::Forest(ForestError::not_found(a)));
        };
        Ok(forest.are_comembers(a, b)?)
    }

    /// Every value in the set containing `value` under `key`.
    pub fn members_of(&mut self, key: &str, value: &[u8]) -> Result<Vec<Vec<u8>>> {
        let Some(forest) = self.forest_mut(key) else {
            return Err(StoreError::Forest(ForestError::not_found(value)));
        };
        Ok(forest.members_of(value)?)
    }

    /// Number of disjoint sets under `key`, zero for a missing key.
    pub fn cardinality(&self, key: &str) -> usize {
        self.forests.get(key).map_or(0, |f| f.cardinality())
    }

    /// Number of elements under `key`, zero for a missing key.
    pub fn element_count(&self, key: &str) -> usize {
        self.forests.get(key).map_or(0, |f| f.len())
    }

    /// A uniformly random element under `key`, `None` for a missing
    /// key.
    pub fn random_element<R: Rng + ?Sized>(&self, key: &str, rng: &mut R) -> Option<Vec<u8>> {
        self.forests
            .get(key)
            .and_then(|forest| forest.random_element(rng))
            .map(|value| value.to_vec())
    }

    /// Drop `key` and its forest entirely.
    pub fn delete_key(&mut self, key: &str) -> bool {
        if self.forests.remove(key).is_some() {
            self.dirty += 1;
            self.pending_events.push(KeyspaceEvent::KeyDeleted {
                key: key.to_string(),
            });
            true
        } else {
            false
        }
    }

    /// Read access to the forest behind `key`.
    pub fn forest(&self, key: &str) -> Option<&DisjointSetForest> {
        self.forests.get(key)
    }

    /// Write access to the forest behind `key`; never creates.
    fn forest_mut(&mut self, key: &str) -> Option<&mut DisjointSetForest> {
        self.forests.get_mut(key)
    }

    /// The forest behind `key`, created and registered on first write.
    fn forest_or_create(&mut self, key: &str) -> &mut DisjointSetForest {
        self.forests.entry(key.to_string()).or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.forests.contains_key(key)
    }

    /// Iterate the keys in lexicographic order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.forests.keys().map(|key| key.as_str())
    }

    /// Number of keys in the keyspace.
    pub fn key_count(&self) -> usize {
        self.forests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forests.is_empty()
    }

    /// Effective writes since the last save.
    pub fn dirty(&self) -> u64 {
        self.dirty
    }

    /// Whether the dirty counter has crossed the policy threshold.
    pub fn should_snapshot(&self) -> bool {
        self.dirty >= self.policy.dirty_threshold
    }

    /// Drain the pending events, oldest first.
    pub fn take_events(&mut self) -> Vec<KeyspaceEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Capture every forest into a sealed archive.
    pub fn to_archive(&self) -> Result<Archive> {
        let mut records: BTreeMap<String, ForestRecord> = BTreeMap::new();
        for (key, forest) in &self.forests {
            records.insert(key.clone(), capture(forest));
        }
        Ok(Archive::seal(&records)?)
    }

    /// Rebuild a keyspace from an archive.
    ///
    /// All or nothing: if any key's records fail their checks, no
    /// keyspace is returned at all. The result carries the default
    /// snapshot policy and a clean dirty counter.
    pub fn from_archive(archive: &Archive) -> Result<Self> {
        let mut forests = BTreeMap::new();
        for (key, record) in archive.open()? {
            forests.insert(key, restore(&record)?);
        }
        Ok(Keyspace {
            forests,
            policy: SnapshotPolicy::default(),
            dirty: 0,
            pending_events: Vec::new(),
        })
    }

    /// Archive the keyspace to a file and reset the dirty counter.
    pub fn save_to_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.to_archive()?.save_to_file(path)?;
        self.dirty = 0;
        Ok(())
    }

    /// Rebuild a keyspace from an archive file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_archive(&Archive::load_from_file(path)?)
    }
}

impl Default for Keyspace {
    fn default() -> Self {
        Self::new()
    }
}
