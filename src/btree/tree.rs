// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! The public B+-tree index: construction, mutation, and lookup.
//!
//! `Tree` owns every node in a single arena and dispatches to the
//! recursive insert and delete routines below. Structural changes
//! (a split sibling, or a rebalance request) propagate back up the
//! recursion as return values rather than through shared mutable state.

use std::mem;

use crate::error::{TreeError, TreeResult};

use super::entry::Entry;
use super::node::{Node, NodeId};
use super::search;

/// An in-memory, single-threaded B+-tree ordered index.
///
/// `K` must be totally ordered and cheap to clone: internal nodes store
/// copies of leaf keys as separators. `V` must be cloneable because point,
/// range, and batched lookups all return owned snapshots rather than
/// borrows into node storage (see the crate-level docs).
#[derive(Debug)]
pub struct Tree<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    degree: usize,
    capacity: usize,
    max_entries: usize,
    min_entries: usize,
    nodes: Vec<Option<Node<K, V>>>,
    free: Vec<NodeId>,
    root: NodeId,
    height: usize,
    size: usize,
}

impl<K, V> Tree<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    /// Creates an empty tree with the given minimum degree.
    ///
    /// `degree` must be at least 2; it fixes `maxEntries = 2*degree - 1`,
    /// `capacity = 2*degree`, and `minEntries = degree - 1` for every
    /// non-root node.
    pub fn new(degree: usize) -> TreeResult<Self> {
        if degree < 2 {
            return Err(TreeError::InvalidDegree { degree });
        }
        let capacity = 2 * degree;
        let root = Node::new_leaf(capacity);
        Ok(Self {
            degree,
            capacity,
            max_entries: 2 * degree - 1,
            min_entries: degree - 1,
            nodes: vec![Some(root)],
            free: Vec::new(),
            root: 0,
            height: 0,
            size: 0,
        })
    }

    /// Inserts `value` under `key`, or replaces the value of an existing
    /// key in place (size and structure unchanged).
    pub fn put(&mut self, key: K, value: V) {
        let height = self.height;
        if let Some(split_sibling) = self.insert_recursive(self.root, height, key, value) {
            let old_root = self.root;
            let left_key = self.node(old_root).entries[0].key().clone();
            let right_key = self.node(split_sibling).entries[0].key().clone();
            let mut new_root = Node::new_internal(self.capacity);
            new_root.entries.push(Entry::Internal {
                key: left_key,
                child: old_root,
            });
            new_root.entries.push(Entry::Internal {
                key: right_key,
                child: split_sibling,
            });
            self.root = self.alloc_node(new_root);
            self.height += 1;
        }
    }

    /// Looks up `key`, returning a clone of its value if present.
    pub fn get(&self, key: &K) -> Option<V> {
        let leaf = self.descend_to_leaf(key);
        let node = self.node(leaf);
        search::exact_match(&node.entries, key).map(|idx| match &node.entries[idx] {
            Entry::Leaf { value, .. } => value.clone(),
            Entry::Internal { .. } => unreachable!("leaf holds only Leaf entries"),
        })
    }

    /// True iff `key` is present.
    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Ascending values for every key in `[start, end]`.
    ///
    /// Fails with [`TreeError::InvalidRange`] if `start > end`.
    pub fn range(&self, start: &K, end: &K) -> TreeResult<Vec<V>> {
        if start > end {
            return Err(TreeError::InvalidRange);
        }
        let mut out = Vec::new();
        let mut cursor = Some(self.descend_to_leaf(start));
        let mut first_leaf = true;
        'leaves: while let Some(id) = cursor {
            let node = self.node(id);
            let from = if first_leaf {
                search::lower_bound(&node.entries, start)
            } else {
                0
            };
            first_leaf = false;
            for entry in &node.entries[from..] {
                if entry.key() > end {
                    break 'leaves;
                }
                if let Entry::Leaf { value, .. } = entry {
                    out.push(value.clone());
                }
            }
            cursor = node.next;
        }
        Ok(out)
    }

    /// Looks up every key in `keys`, which must be ascending-sorted.
    ///
    /// Returns one optional value per input key, in input order; absent
    /// keys map to `None`.
    pub fn get_many(&self, keys: &[K]) -> Vec<Option<V>> {
        let mut out = vec![None; keys.len()];
        if keys.is_empty() {
            return out;
        }
        let mut cursor = Some(self.descend_to_leaf(&keys[0]));
        let mut ki = 0;
        while let Some(id) = cursor {
            let node = self.node(id);
            let mut li = 0;
            while ki < keys.len() && li < node.entries.len() {
                match node.entries[li].key().cmp(&keys[ki]) {
                    std::cmp::Ordering::Less => li += 1,
                    std::cmp::Ordering::Equal => {
                        if let Entry::Leaf { value, .. } = &node.entries[li] {
                            out[ki] = Some(value.clone());
                        }
                        li += 1;
                        ki += 1;
                    }
                    std::cmp::Ordering::Greater => ki += 1,
                }
            }
            if ki >= keys.len() {
                break;
            }
            cursor = node.next;
        }
        out
    }

    /// Removes `key`, returning whether it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        let (removed, _rebalance) = self.remove_recursive(self.root, self.height, key);
        if self.height > 0 && self.node(self.root).len() == 1 {
            let only_child = self.node(self.root).child_at(0).unwrap();
            self.free_node(self.root);
            self.root = only_child;
            self.height -= 1;
        }
        removed
    }

    /// Resets the tree to empty, releasing every previously allocated node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.nodes.push(Some(Node::new_leaf(self.capacity)));
        self.root = 0;
        self.height = 0;
        self.size = 0;
    }

    /// Ascending snapshot of every key.
    pub fn keys(&self) -> Vec<K> {
        let mut out = Vec::with_capacity(self.size);
        self.walk_leaves(|entry| out.push(entry.key().clone()));
        out
    }

    /// Ascending snapshot of every value, ordered by key.
    pub fn values(&self) -> Vec<V> {
        let mut out = Vec::with_capacity(self.size);
        self.walk_leaves(|entry| {
            if let Entry::Leaf { value, .. } = entry {
                out.push(value.clone());
            }
        });
        out
    }

    /// Ascending snapshot of every `(key, value)` pair.
    pub fn entries(&self) -> Vec<(K, V)> {
        let mut out = Vec::with_capacity(self.size);
        self.walk_leaves(|entry| {
            if let Entry::Leaf { key, value } = entry {
                out.push((key.clone(), value.clone()));
            }
        });
        out
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn min_degree(&self) -> usize {
        self.degree
    }

    // ---- internal helpers ----

    /// Resolves a live node id to its storage. Panics if `id` was freed;
    /// every `NodeId` handed out by this tree is expected to stay live
    /// until the structural change that frees it completes.
    fn node(&self, id: NodeId) -> &Node<K, V> {
        self.nodes[id].as_ref().expect("node id must be live")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.nodes[id].as_mut().expect("node id must be live")
    }

    /// Places `node` into a free arena slot, reusing one from `free` when
    /// available, otherwise growing the arena.
    fn alloc_node(&mut self, node: Node<K, V>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id] = Some(node);
            id
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        }
    }

    /// Releases `id` back to the arena's free list for reuse by a later
    /// `alloc_node` call.
    fn free_node(&mut self, id: NodeId) {
        self.nodes[id] = None;
        self.free.push(id);
    }

    /// Descends from the root to the leaf that would hold `key`, following
    /// `descend_index` at each level.
    fn descend_to_leaf(&self, key: &K) -> NodeId {
        let mut node_id = self.root;
        let mut remaining = self.height;
        while remaining > 0 {
            let node = self.node(node_id);
            let i = search::descend_index(&node.entries, key);
            node_id = node.child_at(i).expect("internal node entry must have a child");
            remaining -= 1;
        }
        node_id
    }

    /// Descends from the root always taking child 0, landing on the leaf
    /// holding the smallest key in the tree.
    fn leftmost_leaf(&self) -> NodeId {
        let mut node_id = self.root;
        let mut remaining = self.height;
        while remaining > 0 {
            node_id = self
                .node(node_id)
                .child_at(0)
                .expect("internal node entry must have a child");
            remaining -= 1;
        }
        node_id
    }

    /// Visits every leaf entry in ascending key order by following the
    /// leaf chain from the leftmost leaf.
    fn walk_leaves(&self, mut f: impl FnMut(&Entry<K, V>)) {
        let mut cursor = Some(self.leftmost_leaf());
        while let Some(id) = cursor {
            let node = self.node(id);
            for entry in &node.entries {
                f(entry);
            }
            cursor = node.next;
        }
    }

    /// Smallest key in the subtree rooted at `node_id`, found by always
    /// descending child 0 until a leaf is reached.
    fn subtree_min(&self, mut node_id: NodeId) -> K {
        loop {
            let node = self.node(node_id);
            if node.is_leaf {
                return node.entries[0].key().clone();
            }
            node_id = node.child_at(0).expect("internal node entry must have a child");
        }
    }

    // ---- insert path ----

    /// Inserts into the subtree rooted at `node_id`, at tree-relative
    /// `height` above the leaf level. Returns the split sibling, if any,
    /// to be linked into the caller.
    fn insert_recursive(&mut self, node_id: NodeId, height: usize, key: K, value: V) -> Option<NodeId> {
        if height == 0 {
            let node = self.node_mut(node_id);
            let pos = search::lower_bound(&node.entries, &key);
            if pos < node.entries.len() && node.entries[pos].key() == &key {
                if let Entry::Leaf { value: slot, .. } = &mut node.entries[pos] {
                    *slot = value;
                }
            } else {
                node.entries.insert(pos, Entry::Leaf { key, value });
                self.size += 1;
            }
        } else {
            let i = {
                let node = self.node(node_id);
                search::descend_index(&node.entries, &key)
            };
            let child = self.node(node_id).child_at(i).expect("internal node entry must have a child");
            if let Some(split_child) = self.insert_recursive(child, height - 1, key, value) {
                let new_key = self.node(split_child).entries[0].key().clone();
                self.node_mut(node_id)
                    .entries
                    .insert(i + 1, Entry::Internal { key: new_key, child: split_child });
            }
        }

        if self.node(node_id).len() > self.max_entries {
            Some(self.split_node(node_id))
        } else {
            None
        }
    }

    /// Splits an overflowing node in two: `node_id` keeps entries
    /// `[0, degree)`, a freshly allocated sibling takes `[degree, len)`.
    /// For a leaf split, the sibling is spliced into the leaf chain right
    /// after `node_id`. Returns the new sibling's id.
    fn split_node(&mut self, node_id: NodeId) -> NodeId {
        let (is_leaf, moved) = {
            let node = self.node_mut(node_id);
            let moved = node.entries.split_off(self.degree);
            (node.is_leaf, moved)
        };
        let mut new_node = if is_leaf {
            Node::new_leaf(self.capacity)
        } else {
            Node::new_internal(self.capacity)
        };
        new_node.entries = moved;
        let new_id = self.alloc_node(new_node);

        let old_next = self.node(node_id).next;
        self.node_mut(new_id).next = old_next;
        if let Some(next_id) = old_next {
            self.node_mut(next_id).prev = Some(new_id);
        }
        self.node_mut(node_id).next = Some(new_id);
        self.node_mut(new_id).prev = Some(node_id);

        new_id
    }

    // ---- delete path ----

    /// Returns `(removed, rebalance)`: whether `key` was present, and
    /// whether the caller (the parent frame) must rebalance the child it
    /// just recursed into.
    fn remove_recursive(&mut self, node_id: NodeId, height: usize, key: &K) -> (bool, bool) {
        if height == 0 {
            return self.remove_from_leaf(node_id, key);
        }

        let i = {
            let node = self.node(node_id);
            search::descend_index(&node.entries, key)
        };
        let child = self.node(node_id).child_at(i).expect("internal node entry must have a child");
        let (removed, rebalance_needed) = self.remove_recursive(child, height - 1, key);

        let is_root = node_id == self.root;
        let mut rebalance = false;

        if rebalance_needed {
            let len_before = self.node(node_id).len();
            self.rebalance_child(node_id, height, i);
            let len_after = self.node(node_id).len();
            // A merge (unlike a borrow) shrinks node_id's own entry count
            // by one and can underflow it in turn, independent of whether
            // the deleted key happens to match one of its separators.
            if !is_root && len_after < len_before && len_after <= self.min_entries {
                rebalance = true;
            }
        }

        if removed {
            let matched = {
                let node = self.node(node_id);
                search::exact_match(&node.entries, key)
            };
            if let Some(idx) = matched {
                let n = self.node(node_id).len();
                if n <= self.min_entries && !is_root {
                    rebalance = true;
                } else if is_root && n > 1 {
                    let right_idx = if idx + 1 < n { idx + 1 } else { idx.saturating_sub(1) };
                    let right_child = self.node(node_id).child_at(right_idx).unwrap();
                    let new_key = self.subtree_min(right_child);
                    if let Entry::Internal { key: slot, .. } = &mut self.node_mut(node_id).entries[idx] {
                        *slot = new_key;
                    }
                } else {
                    let child_at_idx = self.node(node_id).child_at(idx).unwrap();
                    let new_key = self.subtree_min(child_at_idx);
                    if let Entry::Internal { key: slot, .. } = &mut self.node_mut(node_id).entries[idx] {
                        *slot = new_key;
                    }
                }
            }
        }

        (removed, rebalance)
    }

    /// Removes `key` directly from a leaf. Returns `(removed, rebalance)`
    /// where `rebalance` signals the leaf fell below `min_entries`.
    fn remove_from_leaf(&mut self, node_id: NodeId, key: &K) -> (bool, bool) {
        let node = self.node_mut(node_id);
        match search::exact_match(&node.entries, key) {
            Some(idx) => {
                node.entries.remove(idx);
                self.size -= 1;
                let rebalance = node.len() < self.min_entries;
                (true, rebalance)
            }
            None => (false, false),
        }
    }

    /// Restores `parent_id`'s child `i` after it underflowed: borrows one
    /// entry from a sibling that can spare it (left sibling preferred),
    /// falling back to a merge with whichever sibling exists.
    fn rebalance_child(&mut self, parent_id: NodeId, height: usize, i: usize) {
        let child_height = height - 1;
        let n = self.node(parent_id).len();
        let has_prev = i > 0;
        let has_next = i + 1 < n;

        if has_prev {
            let prev_id = self.node(parent_id).child_at(i - 1).unwrap();
            if self.node(prev_id).can_be_borrowed_from(child_height, self.min_entries) {
                self.borrow(parent_id, i - 1, i, i, false, true, child_height);
                return;
            }
        }
        if has_next {
            let next_id = self.node(parent_id).child_at(i + 1).unwrap();
            if self.node(next_id).can_be_borrowed_from(child_height, self.min_entries) {
                self.borrow(parent_id, i + 1, i, i + 1, true, false, child_height);
                return;
            }
        }
        if has_prev {
            self.merge(parent_id, i - 1, i);
        } else {
            self.merge(parent_id, i, i + 1);
        }
    }

    /// Moves one entry between `donor_idx` and `recipient_idx`, both
    /// children of `parent_id`, then repairs the separator at `sep_idx`.
    ///
    /// `donor_takes_front` selects which end of the donor loses an entry
    /// (front for a successor donor, back for a predecessor donor);
    /// `insert_at_front` selects which end of the recipient gains it.
    #[allow(clippy::too_many_arguments)]
    fn borrow(
        &mut self,
        parent_id: NodeId,
        donor_idx: usize,
        recipient_idx: usize,
        sep_idx: usize,
        donor_takes_front: bool,
        insert_at_front: bool,
        child_height: usize,
    ) {
        let donor_id = self.node(parent_id).child_at(donor_idx).unwrap();
        let recipient_id = self.node(parent_id).child_at(recipient_idx).unwrap();

        let donor = self.node_mut(donor_id);
        let take_pos = if donor_takes_front { 0 } else { donor.len() - 1 };
        let moved = donor.entries.remove(take_pos);
        let moved_key = moved.key().clone();

        let recipient = self.node_mut(recipient_id);
        let insert_pos = if insert_at_front { 0 } else { recipient.len() };
        recipient.entries.insert(insert_pos, moved);

        if child_height == 0 {
            let sep_child = self.node(parent_id).child_at(sep_idx).unwrap();
            let new_key = self.node(sep_child).entries[0].key().clone();
            if let Entry::Internal { key, .. } = &mut self.node_mut(parent_id).entries[sep_idx] {
                *key = new_key;
            }
        } else {
            let old_sep_key = self.node(parent_id).entries[sep_idx].key().clone();
            if let Entry::Internal { key, .. } = &mut self.node_mut(recipient_id).entries[insert_pos] {
                *key = old_sep_key;
            }
            if let Entry::Internal { key, .. } = &mut self.node_mut(parent_id).entries[sep_idx] {
                *key = moved_key;
            }
        }
    }

    /// Merges `consumed_idx` into `keep_idx` (both children of
    /// `parent_id`) and removes the entry that pointed at `consumed_idx`.
    fn merge(&mut self, parent_id: NodeId, keep_idx: usize, consumed_idx: usize) {
        let keep_id = self.node(parent_id).child_at(keep_idx).unwrap();
        let consumed_id = self.node(parent_id).child_at(consumed_idx).unwrap();
        self.extend_node_with(keep_id, consumed_id);
        self.node_mut(parent_id).entries.remove(consumed_idx);
    }

    /// Appends `src_id`'s entries onto `dst_id`, adopts `src_id`'s `next`
    /// link (repairing that node's `prev`), then frees `src_id`.
    fn extend_node_with(&mut self, dst_id: NodeId, src_id: NodeId) {
        let (src_entries, src_next) = {
            let src = self.node_mut(src_id);
            (mem::take(&mut src.entries), src.next)
        };
        let dst = self.node_mut(dst_id);
        dst.entries.extend(src_entries);
        dst.next = src_next;
        if let Some(next_id) = src_next {
            self.node_mut(next_id).prev = Some(dst_id);
        }
        self.free_node(src_id);
    }

    // ---- display support ----

    pub(super) fn root_id(&self) -> NodeId {
        self.root
    }

    pub(super) fn node_ref(&self, id: NodeId) -> &Node<K, V> {
        self.node(id)
    }

    // ---- test support ----

    /// Walks every live node and panics if any non-root node's entry count
    /// falls outside `[min_entries, max_entries]`. Test-only: production
    /// code relies on the insert/delete paths maintaining this invariant
    /// rather than checking it at runtime.
    #[cfg(test)]
    pub(crate) fn assert_structural_invariants(&self) {
        if self.size == 0 {
            return;
        }
        self.check_node_invariants(self.root, self.height, true);
    }

    #[cfg(test)]
    fn check_node_invariants(&self, node_id: NodeId, height: usize, is_root: bool) {
        let node = self.node(node_id);
        assert!(
            node.len() <= self.max_entries,
            "node {} holds {} entries, exceeding max_entries {}",
            node_id,
            node.len(),
            self.max_entries
        );
        if !is_root {
            assert!(
                node.len() >= self.min_entries,
                "node {} holds {} entries, below min_entries {}",
                node_id,
                node.len(),
                self.min_entries
            );
        }
        if height > 0 {
            for entry in &node.entries {
                let child = entry.child().expect("internal entry must have a child");
                self.check_node_invariants(child, height - 1, false);
            }
        }
    }
}
