// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! An in-memory, single-threaded B+-tree ordered index.
//!
//! `Tree<K, V>` is a generic associative container keyed by any totally
//! ordered `K`, supporting point and range lookup, batched multi-key
//! lookup, deletion with structural rebalancing, and in-order iteration.
//! It holds no locks, spawns no threads, and performs no I/O: the whole
//! structure lives in one arena owned by the `Tree` itself.
//!
//! ```rust
//! use ordtree::Tree;
//!
//! let mut tree = Tree::new(4).unwrap();
//! tree.put(3, "three");
//! tree.put(1, "one");
//! tree.put(2, "two");
//!
//! assert_eq!(tree.get(&2), Some("two"));
//! assert_eq!(tree.keys(), vec![1, 2, 3]);
//! ```

mod btree;
pub mod error;

pub use btree::Tree;
pub use error::{TreeError, TreeResult};
