// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

use crate::btree::entry::Entry;
use crate::btree::node::Node;

fn leaf_with(keys: &[i32]) -> Node<i32, i32> {
    let mut node = Node::new_leaf(8);
    for &k in keys {
        node.entries.push(Entry::Leaf { key: k, value: k });
    }
    node
}

#[test]
fn new_leaf_starts_empty() {
    let node: Node<i32, i32> = Node::new_leaf(8);
    assert_eq!(node.len(), 0);
    assert!(node.is_leaf);
    assert_eq!(node.next, None);
    assert_eq!(node.prev, None);
}

#[test]
fn child_at_returns_none_on_leaf() {
    let node = leaf_with(&[1, 2, 3]);
    assert_eq!(node.child_at(0), None);
}

#[test]
fn child_at_returns_child_on_internal() {
    let mut node: Node<i32, i32> = Node::new_internal(8);
    node.entries.push(Entry::Internal { key: 0, child: 7 });
    node.entries.push(Entry::Internal { key: 10, child: 9 });
    assert_eq!(node.child_at(0), Some(7));
    assert_eq!(node.child_at(1), Some(9));
    assert_eq!(node.child_at(2), None);
}

#[test]
fn can_be_borrowed_from_leaf_requires_strict_surplus() {
    let short = leaf_with(&[1, 2]);
    let long = leaf_with(&[1, 2, 3]);
    assert!(!short.can_be_borrowed_from(0, 2));
    assert!(long.can_be_borrowed_from(0, 2));
}

#[test]
fn can_be_borrowed_from_internal_needs_extra_margin() {
    let mut node: Node<i32, i32> = Node::new_internal(8);
    node.entries.push(Entry::Internal { key: 0, child: 0 });
    node.entries.push(Entry::Internal { key: 1, child: 1 });
    node.entries.push(Entry::Internal { key: 2, child: 2 });
    // min_entries = 1: leaves need n > 1, internal nodes need n > 2.
    assert!(node.can_be_borrowed_from(0, 1));
    assert!(!node.can_be_borrowed_from(1, 1));
}
