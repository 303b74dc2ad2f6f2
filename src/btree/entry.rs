// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! The uniform slot type held by node entry arrays.

use super::node::NodeId;

/// One slot of a node's entry array.
///
/// A leaf entry carries a key and its value; an internal entry carries a
/// key equal to the smallest key of the subtree rooted at `child`. Nodes
/// hold only one variant throughout their lifetime (leaves only ever hold
/// `Leaf`, internal nodes only ever hold `Internal`), but both share this
/// type so a node's backing array is uniform.
#[derive(Debug, Clone)]
pub(crate) enum Entry<K, V> {
    Leaf { key: K, value: V },
    Internal { key: K, child: NodeId },
}

impl<K, V> Entry<K, V> {
    /// The key in either variant: the leaf's own key, or an internal
    /// entry's separator.
    pub(crate) fn key(&self) -> &K {
        match self {
            Entry::Leaf { key, .. } => key,
            Entry::Internal { key, .. } => key,
        }
    }

    /// The child reference, or `None` on a leaf entry.
    pub(crate) fn child(&self) -> Option<NodeId> {
        match self {
            Entry::Internal { child, .. } => Some(*child),
            Entry::Leaf { .. } => None,
        }
    }
}
