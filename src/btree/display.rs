// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Textual pretty-printer for [`Tree`].
//!
//! Kept separate from the core structure: this is a display collaborator,
//! not part of the tree's own invariants. The output format is
//! compatibility-critical and must be reproduced byte-for-byte — see the
//! scenario 4 snapshot test in `display_test.rs`.

use std::fmt;

use super::entry::Entry;
use super::node::NodeId;
use super::tree::Tree;

impl<K, V> fmt::Display for Tree<K, V>
where
    K: Ord + Clone + fmt::Display,
    V: Clone + fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        print_node(self, self.root_id(), 0, f)
    }
}

/// Depth-first, right-to-left: a node's rightmost subtree (the one
/// holding the largest keys) is printed first, so the output reads with
/// the largest keys at the top.
fn print_node<K, V>(tree: &Tree<K, V>, node_id: NodeId, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result
where
    K: Ord + Clone + fmt::Display,
    V: Clone + fmt::Display,
{
    let node = tree.node_ref(node_id);
    if node.is_leaf {
        for entry in node.entries.iter().rev() {
            if let Entry::Leaf { key, value } = entry {
                for _ in 0..depth {
                    write!(f, "\t")?;
                }
                writeln!(f, "{} {}", key, value)?;
            }
        }
        return Ok(());
    }

    let n = node.entries.len();
    for idx in (0..n).rev() {
        let child = node.entries[idx].child().expect("internal entry must have a child");
        print_node(tree, child, depth + 1, f)?;
        if idx > 0 {
            for _ in 0..depth {
                write!(f, "\t")?;
            }
            writeln!(f, "({})", node.entries[idx].key())?;
        }
    }
    Ok(())
}
