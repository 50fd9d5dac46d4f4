use pagetree::{BTree, STree};
use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum MapOperation {
    Set { key: u16, value: u8 },
    Delete { key: u16 },
    Drop { count: usize },
    Take { count: usize },
}

#[derive(Debug, Clone)]
enum SequenceOperation {
    Insert { index: usize, value: i32 },
    Remove { index: usize },
    Update { index: usize, value: i32 },
    Move { from: usize, to: usize },
}

fn arb_map_operation() -> impl Strategy<Value = MapOperation> {
    prop_oneof![
        6 => (0u16..200, any::<u8>()).prop_map(|(key, value)| MapOperation::Set { key, value }),
        3 => (0u16..200).prop_map(|key| MapOperation::Delete { key }),
        1 => (0usize..8).prop_map(|count| MapOperation::Drop { count }),
        1 => (20usize..200).prop_map(|count| MapOperation::Take { count }),
    ]
}

// Indices are reduced modulo the current length when applied.
fn arb_sequence_operation() -> impl Strategy<Value = SequenceOperation> {
    prop_oneof![
        5 => (any::<usize>(), any::<i32>()).prop_map(|(index, value)| SequenceOperation::Insert { index, value }),
        3 => any::<usize>().prop_map(|index| SequenceOperation::Remove { index }),
        2 => (any::<usize>(), any::<i32>()).prop_map(|(index, value)| SequenceOperation::Update { index, value }),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(from, to)| SequenceOperation::Move { from, to }),
    ]
}

proptest! {
    #[test]
    fn prop_map_matches_btreemap(
        split in 4usize..12,
        ops in prop::collection::vec(arb_map_operation(), 1..300)
    ) {
        let mut tree = BTree::with_page_split_size(split).unwrap();
        let mut reference = BTreeMap::new();

        for op in ops {
            match op {
                MapOperation::Set { key, value } => {
                    tree.set(key, value);
                    reference.insert(key, value);
                }
                MapOperation::Delete { key } => {
                    prop_assert_eq!(tree.delete(&key), reference.remove(&key).is_some());
                }
                MapOperation::Drop { count } => {
                    tree.drop(count);
                    reference = reference.into_iter().skip(count).collect();
                }
                MapOperation::Take { count } => {
                    tree.take(count);
                    reference = reference.into_iter().take(count).collect();
                }
            }
            prop_assert_eq!(tree.len(), reference.len());
        }

        let entries: Vec<(u16, u8)> = tree.entries().collect();
        let expected: Vec<(u16, u8)> = reference.into_iter().collect();
        prop_assert_eq!(entries, expected);
        prop_assert!(tree.check_invariants());
    }

    #[test]
    fn prop_updates_keep_shape(
        split in 4usize..10,
        keys in prop::collection::vec(0u32..1000, 0..400),
        deletions in prop::collection::vec(0u32..1000, 0..400)
    ) {
        let mut tree = BTree::with_page_split_size(split).unwrap();
        for key in &keys {
            tree.set(*key, ());
        }
        prop_assert!(tree.validate().is_ok());
        for key in &deletions {
            tree.delete(key);
        }
        prop_assert!(tree.validate().is_ok());
        prop_assert!(tree.leaf_sizes().iter().all(|&size| size <= split));
        prop_assert!(tree.node_arities().iter().all(|&arity| arity <= split));
    }

    #[test]
    fn prop_snapshots_are_unaffected_by_later_updates(
        keys in prop::collection::vec(0i64..500, 1..200),
        updates in prop::collection::vec((0i64..500, any::<bool>()), 1..100)
    ) {
        let mut tree: BTree<i64, i64> = keys.iter().map(|&key| (key, key)).collect();
        let snapshot = tree.clone();
        let expected: Vec<(i64, i64)> = snapshot.entries().collect();

        for (key, insert) in updates {
            if insert {
                tree.set(key, -key);
            } else {
                tree.delete(&key);
            }
        }
        prop_assert_eq!(snapshot.entries().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn prop_sequence_matches_vec(
        split in 4usize..10,
        ops in prop::collection::vec(arb_sequence_operation(), 1..300)
    ) {
        let mut seq = STree::with_page_split_size(split).unwrap();
        let mut reference: Vec<i32> = Vec::new();

        for op in ops {
            match op {
                SequenceOperation::Insert { index, value } => {
                    let index = index % (reference.len() + 1);
                    seq.insert(index, value, None).unwrap();
                    reference.insert(index, value);
                }
                SequenceOperation::Remove { index } if !reference.is_empty() => {
                    let index = index % reference.len();
                    prop_assert_eq!(seq.remove(index).unwrap(), reference.remove(index));
                }
                SequenceOperation::Update { index, value } if !reference.is_empty() => {
                    let index = index % reference.len();
                    seq.update(index, value).unwrap();
                    reference[index] = value;
                }
                SequenceOperation::Move { from, to } if !reference.is_empty() => {
                    let from = from % reference.len();
                    let to = to % reference.len();
                    seq.move_entry(from, to).unwrap();
                    let value = reference.remove(from);
                    reference.insert(to, value);
                }
                _ => {}
            }
        }

        prop_assert_eq!(seq.values().collect::<Vec<_>>(), reference);
        prop_assert!(seq.validate().is_ok());
    }

    #[test]
    fn prop_sequence_slices(
        len in 0usize..120,
        lower in 0usize..130,
        count in 0usize..130
    ) {
        let mut seq: STree<usize> = STree::with_page_split_size(4).unwrap();
        seq.extend(0..len);
        let ids: Vec<u64> = seq.keys().collect();

        seq.drop(lower).take(count);
        let start = lower.min(len);
        let end = (start + count).min(len);
        prop_assert_eq!(seq.values().collect::<Vec<_>>(), (start..end).collect::<Vec<_>>());
        prop_assert_eq!(seq.keys().collect::<Vec<_>>(), ids[start..end].to_vec());
        prop_assert!(seq.check_invariants());
    }

    #[test]
    fn prop_fold_matches_direct_sum(
        values in prop::collection::vec(-1000i64..1000, 0..300),
        edits in prop::collection::vec((any::<usize>(), -1000i64..1000), 0..20)
    ) {
        let mut seq: STree<i64, u64, i64> = STree::with_context(Default::default());
        seq.extend(values.iter().copied());
        let mut reference = values;
        let sum = |seq: &mut STree<i64, u64, i64>| seq.reduced(0, |acc, v| acc + v, |acc, fold| acc + fold);

        prop_assert_eq!(sum(&mut seq), reference.iter().sum::<i64>());
        for (index, value) in edits {
            if reference.is_empty() {
                break;
            }
            let index = index % reference.len();
            seq.update(index, value).unwrap();
            reference[index] = value;
            prop_assert_eq!(sum(&mut seq), reference.iter().sum::<i64>());
        }
    }
}
