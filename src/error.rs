// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Error types for tree operations.

use std::fmt;

/// Standard Result type for all tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Error types for tree operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Tree constructed with a degree below the minimum of 2.
    InvalidDegree { degree: usize },

    /// Range lookup called with `start` greater than `end`.
    InvalidRange,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDegree { degree } => {
                write!(f, "tree degree must be >= 2, got {}", degree)
            }
            Self::InvalidRange => {
                write!(f, "range start key must not be greater than end key")
            }
        }
    }
}

impl std::error::Error for TreeError {}
