// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

use crate::btree::tree::Tree;
use crate::error::TreeError;

fn scenario_4() -> Tree<i32, String> {
    let mut t: Tree<i32, String> = Tree::new(2).unwrap();
    t.put(3, "3".to_string());
    t.put(2, "2".to_string());
    t.put(9, "9".to_string());
    t.put(15, "15".to_string());
    t.put(16, "16".to_string());
    t.put(17, "17".to_string());
    t.put(0, "0".to_string());
    t.put(1, "1".to_string());
    t
}

#[test]
fn construct_rejects_small_degree() {
    let err = Tree::<i32, i32>::new(1).unwrap_err();
    assert_eq!(err, TreeError::InvalidDegree { degree: 1 });
}

#[test]
fn empty_tree_scenario() {
    let t: Tree<i32, i32> = Tree::new(2).unwrap();
    assert!(t.is_empty());
    assert_eq!(t.height(), 0);
    assert_eq!(t.len(), 0);
    assert_eq!(t.keys(), Vec::<i32>::new());
    assert_eq!(t.values(), Vec::<i32>::new());
    assert_eq!(t.get(&5), None);
}

#[test]
fn build_and_split_scenario() {
    let mut t: Tree<i32, String> = Tree::new(2).unwrap();
    t.put(3, "3".to_string());
    t.put(2, "2".to_string());
    t.put(9, "9".to_string());
    assert_eq!(t.height(), 0);
    assert_eq!(t.len(), 3);
    assert_eq!(t.keys(), vec![2, 3, 9]);

    t.put(15, "15".to_string());
    assert_eq!(t.height(), 1);
    assert_eq!(t.len(), 4);
    for k in [2, 3, 9, 15] {
        assert!(t.contains(&k));
    }
}

#[test]
fn update_semantics_scenario() {
    let mut t: Tree<i32, String> = Tree::new(2).unwrap();
    t.put(3, "3".to_string());
    t.put(2, "2".to_string());
    t.put(9, "9".to_string());
    t.put(15, "15".to_string());

    t.put(3, "45".to_string());
    assert_eq!(t.keys(), vec![2, 3, 9, 15]);
    assert_eq!(
        t.values(),
        vec!["2".to_string(), "45".to_string(), "9".to_string(), "15".to_string()]
    );
    assert_eq!(t.len(), 4);
}

#[test]
fn bulk_grow_scenario() {
    let t = scenario_4();
    assert_eq!(t.height(), 2);
    assert_eq!(t.len(), 8);
    assert_eq!(t.keys(), vec![0, 1, 2, 3, 9, 15, 16, 17]);
}

#[test]
fn range_lookup_scenario() {
    let t = scenario_4();
    let s = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    assert_eq!(t.range(&0, &2).unwrap(), s(&["0", "1", "2"]));
    assert_eq!(t.range(&3, &15).unwrap(), s(&["3", "9", "15"]));
    assert_eq!(t.range(&16, &20).unwrap(), s(&["16", "17"]));
    assert_eq!(t.range(&18, &20).unwrap(), Vec::<String>::new());
}

#[test]
fn range_lookup_rejects_inverted_bounds() {
    let t = scenario_4();
    assert_eq!(t.range(&10, &5).unwrap_err(), TreeError::InvalidRange);
}

#[test]
fn batched_lookup_scenario() {
    let t = scenario_4();
    let got = t.get_many(&[0, 2, 3]);
    assert_eq!(
        got,
        vec![Some("0".to_string()), Some("2".to_string()), Some("3".to_string())]
    );
    assert_eq!(t.get_many(&[18, 20]), vec![None, None]);
    assert_eq!(t.get_many(&[]), Vec::<Option<String>>::new());
}

#[test]
fn delete_with_height_shrink_scenario() {
    let mut t = scenario_4();

    assert!(t.remove(&1));
    assert_eq!(t.len(), 7);
    assert_eq!(t.height(), 2);
    t.assert_structural_invariants();

    assert!(t.remove(&0));
    assert_eq!(t.len(), 6);
    assert_eq!(t.height(), 2);
    t.assert_structural_invariants();

    assert!(t.remove(&2));
    assert_eq!(t.len(), 5);
    assert_eq!(t.height(), 1);
    t.assert_structural_invariants();

    assert_eq!(t.keys(), vec![3, 9, 15, 16, 17]);
}

#[test]
fn remove_absent_key_is_a_no_op() {
    let mut t = scenario_4();
    assert!(!t.remove(&1000));
    assert_eq!(t.len(), 8);
    assert_eq!(t.keys(), vec![0, 1, 2, 3, 9, 15, 16, 17]);
}

#[test]
fn default_valued_key_insert_scenario() {
    let mut t: Tree<i32, i32> = Tree::new(2).unwrap();
    t.put(0, 0);
    assert_eq!(t.len(), 1);
    assert_eq!(t.get(&0), Some(0));
}

#[test]
fn clear_is_idempotent() {
    let mut t = scenario_4();
    t.clear();
    assert!(t.is_empty());
    assert_eq!(t.height(), 0);
    assert_eq!(t.get(&3), None);

    t.clear();
    assert!(t.is_empty());
}

#[test]
fn leaf_chain_matches_in_order_descent() {
    let mut t: Tree<i32, i32> = Tree::new(2).unwrap();
    let mut inserted: Vec<i32> = (0..200).rev().collect();
    for &k in &inserted {
        t.put(k, k * 10);
    }
    inserted.sort();
    assert_eq!(t.keys(), inserted);
    assert_eq!(t.len(), inserted.len());
}

#[test]
fn random_insert_and_remove_preserves_reference_map() {
    use std::collections::BTreeMap;

    let mut t: Tree<i32, i32> = Tree::new(3).unwrap();
    let mut reference: BTreeMap<i32, i32> = BTreeMap::new();

    // Deterministic pseudo-random sequence (xorshift) so this needs no
    // external rand dependency.
    let mut state: u32 = 0x9E3779B9;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state % 500) as i32
    };

    for i in 0..2000 {
        let k = next();
        if i % 5 == 0 {
            let removed = t.remove(&k);
            assert_eq!(removed, reference.remove(&k).is_some());
        } else {
            t.put(k, k * 2);
            reference.insert(k, k * 2);
        }
        t.assert_structural_invariants();
    }

    assert_eq!(t.len(), reference.len());
    assert_eq!(t.keys(), reference.keys().copied().collect::<Vec<_>>());
    for (&k, &v) in &reference {
        assert_eq!(t.get(&k), Some(v));
    }
}

/// Regression test for a merge that underflows a non-root internal node
/// without the deleted key matching any of that node's own separators.
/// `new(3)` gives `min_entries = 2`; three leaves split under one root
/// each land at exactly `min_entries`, so deleting one non-minimum key
/// forces a merge that must propagate rebalancing past the separator
/// check alone.
#[test]
fn merge_propagates_underflow_when_deleted_key_is_not_a_separator() {
    let mut t: Tree<i32, i32> = Tree::new(3).unwrap();
    for k in [5, 8, 11, 14, 17, 20, 23, 26, 29, 32, 35, 38] {
        t.put(k, k);
    }
    t.assert_structural_invariants();

    for k in [8, 14, 23, 29, 35] {
        assert!(t.remove(&k));
        t.assert_structural_invariants();
    }

    assert_eq!(t.keys(), vec![5, 11, 17, 20, 26, 32, 38]);
}
