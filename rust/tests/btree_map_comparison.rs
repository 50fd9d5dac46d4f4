use pagetree::{BTree, BTreePage, PageLimits};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

fn assert_matches(tree: &BTree<i32, String>, reference: &BTreeMap<i32, String>) {
    assert_eq!(tree.len(), reference.len());
    let entries: Vec<(i32, String)> = tree.entries().collect();
    let expected: Vec<(i32, String)> = reference.iter().map(|(k, v)| (*k, v.clone())).collect();
    assert_eq!(entries, expected);
    if let Err(err) = tree.validate() {
        tree.print_page_tree();
        panic!("invalid tree: {}", err);
    }
}

#[test]
fn test_random_operations_vs_btreemap() {
    for &split in &[4, 5, 8, 32] {
        let mut rng = StdRng::seed_from_u64(42 + split as u64);
        let mut tree = BTree::with_page_split_size(split).unwrap();
        let mut reference = BTreeMap::new();

        for step in 0..3000 {
            let key = rng.gen_range(0..500);
            if rng.gen_bool(0.6) {
                let value = format!("v{}", rng.gen_range(0..10));
                tree.set(key, value.clone());
                reference.insert(key, value);
            } else {
                let removed = tree.delete(&key);
                assert_eq!(removed, reference.remove(&key).is_some());
            }
            assert_eq!(tree.get(&key), reference.get(&key));
            if step % 250 == 0 {
                assert_matches(&tree, &reference);
            }
        }
        assert_matches(&tree, &reference);
    }
}

#[test]
fn test_small_split_insertion_produces_sorted_node_root() {
    let mut tree = BTree::with_page_split_size(4).unwrap();
    for key in [5, 3, 8, 1, 4, 7, 2, 6] {
        tree.set(key, key * 10);
    }
    assert_eq!(tree.keys().collect::<Vec<_>>(), (1..=8).collect::<Vec<_>>());
    assert!(tree.root().is_node());
    assert!(tree.validate().is_ok());
    assert_eq!(tree.get(&4), Some(&40));
    assert_eq!(tree.get(&9), None);
}

#[test]
fn test_setting_equal_value_keeps_root() {
    let mut tree = BTree::new();
    tree.set("a", 1);
    let before = tree.clone();
    tree.set("a", 1);
    assert!(tree.ptr_eq(&before));
    assert!(tree.root().ptr_eq(before.root()));

    tree.set("a", 2);
    assert!(!tree.ptr_eq(&before));
    assert_eq!(before.get(&"a"), Some(&1));
    assert_eq!(tree.get(&"a"), Some(&2));
}

#[test]
fn test_deleting_everything_returns_canonical_empty_page() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut keys: Vec<u32> = (0..100).map(|_| rng.gen()).collect();
    keys.sort_unstable();
    keys.dedup();

    let mut tree = BTree::with_page_split_size(4).unwrap();
    for &key in &keys {
        tree.set(key, ());
    }
    assert_eq!(tree.len(), keys.len());

    for _ in 0..keys.len() {
        let index = rng.gen_range(0..keys.len());
        let key = keys.swap_remove(index);
        assert!(tree.delete(&key));
        assert!(tree.validate().is_ok());
    }
    assert!(tree.is_empty());
    assert!(tree.root().ptr_eq(&BTreePage::empty()));
    assert!(!tree.delete(&0));
}

#[test]
fn test_deleting_missing_key_keeps_root() {
    let mut tree: BTree<i32, i32> = (0..50).map(|k| (k * 2, k)).collect();
    let before = tree.clone();
    assert!(!tree.delete(&7));
    assert!(tree.ptr_eq(&before));
}

#[test]
fn test_neighbor_queries_vs_btreemap() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut tree = BTree::with_page_split_size(5).unwrap();
    let mut reference = BTreeMap::new();
    for _ in 0..400 {
        let key = rng.gen_range(0..2000) * 3;
        tree.set(key, key);
        reference.insert(key, key);
    }

    for target in -5..6010 {
        let next = reference.range(target + 1..).next();
        let previous = reference.range(..target).next_back();
        assert_eq!(tree.next_entry(&target), next, "next of {}", target);
        assert_eq!(tree.previous_entry(&target), previous, "previous of {}", target);
        assert_eq!(tree.next_key(&target), next.map(|(k, _)| k));
        assert_eq!(tree.previous_value(&target), previous.map(|(_, v)| v));
    }
    assert_eq!(tree.first_entry(), reference.iter().next());
    assert_eq!(tree.last_entry(), reference.iter().next_back());
}

#[test]
fn test_positional_access_vs_btreemap() {
    let tree: BTree<i32, i32> = (0..300).map(|k| (k * 7 % 1000, k)).collect();
    let reference: BTreeMap<i32, i32> = (0..300).map(|k| (k * 7 % 1000, k)).collect();
    for (index, entry) in reference.iter().enumerate() {
        assert_eq!(tree.get_entry(index), Some(entry));
    }
    assert_eq!(tree.get_entry(reference.len()), None);
}

#[test]
fn test_forward_and_reverse_order() {
    let tree: BTree<i32, i32> = (0..200).rev().map(|k| (k, -k)).collect();
    let forward: Vec<i32> = tree.keys().collect();
    assert_eq!(forward, (0..200).collect::<Vec<_>>());

    let mut reverse = tree.reverse_values();
    let mut backward = Vec::new();
    while let Some(value) = pagetree::Cursor::previous(&mut reverse) {
        backward.push(value);
    }
    assert_eq!(backward, (0..200).rev().map(|k| -k).collect::<Vec<_>>());
}

#[test]
fn test_pure_updates_share_structure() {
    let base: BTree<i32, i32> = (0..1000).map(|k| (k, k)).collect();
    let changed = base.updated(500, -1);
    let removed = base.removed(&10);

    assert_eq!(base.get(&500), Some(&500));
    assert_eq!(changed.get(&500), Some(&-1));
    assert_eq!(base.len(), 1000);
    assert_eq!(removed.len(), 999);
    assert!(!removed.contains_key(&10));

    assert!(base.updated(500, 500).ptr_eq(&base));
    assert!(base.removed(&5000).ptr_eq(&base));

    let cleared = base.cleared();
    assert!(cleared.is_empty());
    assert_eq!(cleared.context().page_split_size(), base.context().page_split_size());
}

#[test]
fn test_shape_bounds_at_split_size_four() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut tree = BTree::with_page_split_size(4).unwrap();
    for step in 0..2000 {
        let key = rng.gen_range(0..300);
        if rng.gen_bool(0.55) {
            tree.set(key, step);
        } else {
            tree.delete(&key);
        }
        assert!(tree.leaf_sizes().iter().all(|&size| (1..=4).contains(&size) || tree.is_empty()));
        assert!(tree.validate().is_ok(), "step {}", step);
    }
}

#[test]
fn test_node_width_stays_bounded_under_random_set_and_delete() {
    for &split in &[4, 5, 8, 16] {
        for seed in 0..3 {
            let mut rng = StdRng::seed_from_u64(seed * 1000 + split as u64);
            let mut tree = BTree::with_page_split_size(split).unwrap();
            for step in 0..4000 {
                let key = rng.gen_range(0..600);
                if rng.gen_bool(0.5) {
                    tree.set(key, step);
                } else {
                    tree.delete(&key);
                }
                let arities = tree.node_arities();
                assert!(
                    arities.iter().all(|&arity| arity >= split / 2 && arity <= split),
                    "split {} seed {} step {}: {:?}",
                    split,
                    seed,
                    step,
                    arities
                );
            }
            assert!(tree.validate().is_ok());
        }
    }
}

#[test]
fn test_slices_vs_btreemap() {
    let reference: Vec<(i32, i32)> = (0..60).map(|k| (k, k * k)).collect();
    let tree: BTree<i32, i32> = reference.iter().cloned().collect();
    for lower in 0..=60 {
        for upper in lower..=60 {
            let mut slice = tree.clone();
            slice.drop(lower).take(upper - lower);
            let entries: Vec<(i32, i32)> = slice.entries().collect();
            assert_eq!(entries, reference[lower..upper].to_vec());
            assert!(slice.check_invariants(), "slice {}..{}", lower, upper);
        }
    }
    assert_eq!(tree.len(), 60);
}

#[test]
fn test_fold_is_cached_until_update() {
    let mut tree: BTree<i32, i32, i64> = BTree::with_context(Default::default());
    for key in 0..500 {
        tree.set(key, key);
    }
    let sum = |tree: &mut BTree<i32, i32, i64>| {
        tree.reduced(0, |acc, value| acc + *value as i64, |acc, fold| acc + fold)
    };

    assert_eq!(sum(&mut tree), 124_750);
    let cached = tree.clone();
    assert_eq!(sum(&mut tree), 124_750);
    assert!(tree.ptr_eq(&cached));

    tree.set(0, 1000);
    assert!(tree.fold().is_none());
    assert_eq!(sum(&mut tree), 125_750);
}
