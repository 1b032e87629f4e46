//! Property-based tests for the disjoint-set forest.
//!
//! A flat reference partition (a list of sets of values) replays the
//! same scripts the forest does. The forest must agree with it on
//! every observable: membership, co-membership, element count and set
//! count. On top of that the tests pin the laws the structure leans
//! on:
//!  - co-membership is an equivalence relation
//!  - lookups may rewire links but never change observable state
//!  - union is insensitive to argument order
//!  - removal never disturbs memberships among the survivors

use dsfs_core::{Comembership, DisjointSetForest};
use proptest::prelude::*;
use std::collections::BTreeSet;

const UNIVERSE: u8 = 12;

fn value(i: u8) -> Vec<u8> {
    format!("m{:02}", i).into_bytes()
}

#[derive(Clone, Debug)]
enum Op {
    Add(u8),
    Union(u8, u8),
    Remove(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..UNIVERSE).prop_map(Op::Add),
        2 => (0..UNIVERSE, 0..UNIVERSE).prop_map(|(a, b)| Op::Union(a, b)),
        1 => (0..UNIVERSE).prop_map(Op::Remove),
    ]
}

fn script_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 0..48)
}

/// Reference partition: the same sets, kept the slow and obvious way.
#[derive(Clone, Debug, Default)]
struct PartitionModel {
    sets: Vec<BTreeSet<Vec<u8>>>,
}

impl PartitionModel {
    fn position(&self, value: &[u8]) -> Option<usize> {
        self.sets.iter().position(|set| set.contains(value))
    }

    fn add(&mut self, value: &[u8]) {
        if self.position(value).is_none() {
            let mut set = BTreeSet::new();
            set.insert(value.to_vec());
            self.sets.push(set);
        }
    }

    fn union(&mut self, a: &[u8], b: &[u8]) {
        let (Some(pos_a), Some(pos_b)) = (self.position(a), self.position(b)) else {
            return;
        };
        if pos_a == pos_b {
            return;
        }
        let hi = pos_a.max(pos_b);
        let lo = pos_a.min(pos_b);
        let merged = self.sets.swap_remove(hi);
        self.sets[lo].extend(merged);
    }

    fn remove(&mut self, value: &[u8]) {
        if let Some(pos) = self.position(value) {
            self.sets[pos].remove(value);
            if self.sets[pos].is_empty() {
                self.sets.swap_remove(pos);
            }
        }
    }

    fn same_set(&self, a: &[u8], b: &[u8]) -> Option<bool> {
        match (self.position(a), self.position(b)) {
            (Some(pos_a), Some(pos_b)) => Some(pos_a == pos_b),
            _ => None,
        }
    }

    fn len(&self) -> usize {
        self.sets.iter().map(|set| set.len()).sum()
    }

    fn cardinality(&self) -> usize {
        self.sets.len()
    }

    fn values(&self) -> Vec<Vec<u8>> {
        self.sets.iter().flatten().cloned().collect()
    }

    fn all_singletons(&self) -> bool {
        self.sets.iter().all(|set| set.len() == 1)
    }
}

fn build(script: &[Op]) -> (DisjointSetForest, PartitionModel) {
    let mut forest = DisjointSetForest::new();
    let mut model = PartitionModel::default();
    for op in script {
        match op {
            Op::Add(i) => {
                forest.add(&value(*i));
                model.add(&value(*i));
            }
            Op::Union(a, b) => {
                let _ = forest.union(&value(*a), &value(*b));
                model.union(&value(*a), &value(*b));
            }
            Op::Remove(i) => {
                let _ = forest.remove(&value(*i));
                model.remove(&value(*i));
            }
        }
    }
    (forest, model)
}

/// Co-membership over the whole value universe. `skip` leaves every
/// pair touching one value out of the picture.
fn comembership_matrix(forest: &mut DisjointSetForest, skip: Option<u8>) -> Vec<Option<bool>> {
    let mut matrix = Vec::new();
    for i in 0..UNIVERSE {
        for j in 0..UNIVERSE {
            if skip == Some(i) || skip == Some(j) {
                matrix.push(None);
                continue;
            }
            matrix.push(match forest.are_comembers(&value(i), &value(j)) {
                Ok(Comembership::SameSet) => Some(true),
                Ok(Comembership::DifferentSets) => Some(false),
                Err(_) => None,
            });
        }
    }
    matrix
}

// ============================================================================
// Agreement with the reference partition
// ============================================================================

proptest! {
    #[test]
    fn forest_matches_reference_partition(script in script_strategy()) {
        let (mut forest, model) = build(&script);
        prop_assert_eq!(forest.len(), model.len());
        prop_assert_eq!(forest.cardinality(), model.cardinality());
        for i in 0..UNIVERSE {
            for j in 0..UNIVERSE {
                let got = match forest.are_comembers(&value(i), &value(j)) {
                    Ok(Comembership::SameSet) => Some(true),
                    Ok(Comembership::DifferentSets) => Some(false),
                    Err(_) => None,
                };
                prop_assert_eq!(got, model.same_set(&value(i), &value(j)));
            }
        }
    }

    #[test]
    fn materialized_sets_match_reference_partition(script in script_strategy()) {
        let (mut forest, model) = build(&script);
        for member in model.values() {
            let mut got = forest.members_of(&member).unwrap();
            got.sort();
            let pos = model.position(&member).unwrap();
            let want: Vec<Vec<u8>> = model.sets[pos].iter().cloned().collect();
            prop_assert_eq!(got, want);
        }
    }

    #[test]
    fn cardinality_equals_len_only_for_singleton_partitions(script in script_strategy()) {
        let (forest, model) = build(&script);
        prop_assert!(forest.cardinality() <= forest.len());
        prop_assert_eq!(
            forest.cardinality() == forest.len(),
            model.all_singletons()
        );
    }
}

// ============================================================================
// Structural laws
// ============================================================================

proptest! {
    #[test]
    fn comembership_is_reflexive_and_symmetric(script in script_strategy()) {
        let (mut forest, model) = build(&script);
        let present = model.values();
        for a in &present {
            prop_assert_eq!(
                forest.are_comembers(a, a),
                Ok(Comembership::SameSet)
            );
            for b in &present {
                prop_assert_eq!(
                    forest.are_comembers(a, b),
                    forest.are_comembers(b, a)
                );
            }
        }
    }

    #[test]
    fn lookups_never_change_observable_state(script in script_strategy()) {
        let (mut forest, _) = build(&script);
        let len = forest.len();
        let cardinality = forest.cardinality();
        let before = comembership_matrix(&mut forest, None);
        // A full materialization sweep compresses every path there is.
        let members: Vec<Vec<u8>> = forest.values().map(|v| v.to_vec()).collect();
        for member in members {
            forest.members_of(&member).unwrap();
        }
        let after = comembership_matrix(&mut forest, None);
        prop_assert_eq!(before, after);
        prop_assert_eq!(forest.len(), len);
        prop_assert_eq!(forest.cardinality(), cardinality);
    }

    #[test]
    fn union_argument_order_is_irrelevant(
        script in script_strategy(),
        a in 0..UNIVERSE,
        b in 0..UNIVERSE,
    ) {
        let (mut left, _) = build(&script);
        let mut right = left.clone();
        let _ = left.union(&value(a), &value(b));
        let _ = right.union(&value(b), &value(a));
        prop_assert_eq!(left.cardinality(), right.cardinality());
        prop_assert_eq!(
            comembership_matrix(&mut left, None),
            comembership_matrix(&mut right, None)
        );
    }

    #[test]
    fn removal_leaves_survivors_alone(
        script in script_strategy(),
        pick in 0..UNIVERSE,
    ) {
        let (mut forest, _) = build(&script);
        let victim = value(pick);
        prop_assume!(forest.contains(&victim));

        let was_singleton = forest.members_of(&victim).unwrap().len() == 1;
        let len = forest.len();
        let cardinality = forest.cardinality();
        let before = comembership_matrix(&mut forest, Some(pick));

        forest.remove(&victim).unwrap();

        prop_assert!(!forest.contains(&victim));
        prop_assert_eq!(forest.len(), len - 1);
        prop_assert_eq!(
            forest.cardinality(),
            cardinality - usize::from(was_singleton)
        );
        prop_assert_eq!(comembership_matrix(&mut forest, Some(pick)), before);
    }
}
