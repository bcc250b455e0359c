//! Session-scoped deduplication of constant leaves.
//!
//! Constants are keyed by the exact bit patterns of their values (with `-0.0`
//! folded into `0.0`) plus their shape, so a vector and a one-row matrix holding
//! the same numbers never collide.

use std::collections::HashMap;

use crate::reference::Ref;

/// Structural key of a constant leaf.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ConstKey {
    /// `None` for vector constants, `Some((rows, cols))` for matrices.
    shape: Option<(usize, usize)>,
    bits: Vec<u64>,
}

impl ConstKey {
    pub fn vector(values: &[f64]) -> Self {
        Self {
            shape: None,
            bits: fingerprint(values),
        }
    }

    pub fn matrix(rows: usize, cols: usize, values: &[f64]) -> Self {
        Self {
            shape: Some((rows, cols)),
            bits: fingerprint(values),
        }
    }
}

fn fingerprint(values: &[f64]) -> Vec<u64> {
    values
        .iter()
        .map(|&v| if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() })
        .collect()
}

/// A cache of already-built constant leaves, backed by [HashMap].
#[derive(Debug, Default)]
pub struct ParamCache {
    map: HashMap<ConstKey, Ref>,
    hits: usize,
    misses: usize,
}

impl ParamCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of distinct constants registered.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn get(&mut self, key: &ConstKey) -> Option<Ref> {
        match self.map.get(key) {
            Some(&r) => {
                self.hits += 1;
                Some(r)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: ConstKey, node: Ref) {
        self.map.insert(key, node);
    }
}
