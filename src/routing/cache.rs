//! Memo of insertion attempts for the current optimization run.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::model::RoutePointIndex;
use crate::routing::Route;

/// Entries kept before the cache stops growing.
pub const INSERTION_CACHE_CAPACITY: usize = 100_000;

/// Maps `(route state, delivery, position)` to the duration of the
/// resulting route, or `None` when that insertion is infeasible.
///
/// The cache belongs to one run; it is never shared across runs.
#[derive(Debug, Clone)]
pub struct InsertionCache {
    entries: HashMap<u64, Option<i64>>,
    capacity: usize,
    hits: usize,
}

impl Default for InsertionCache {
    fn default() -> Self {
        Self::with_capacity(INSERTION_CACHE_CAPACITY)
    }
}

impl InsertionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
            hits: 0,
        }
    }

    pub fn key(route: &Route, delivery: RoutePointIndex, position: usize) -> u64 {
        let mut hasher = DefaultHasher::new();
        route.hash(&mut hasher);
        delivery.hash(&mut hasher);
        position.hash(&mut hasher);
        hasher.finish()
    }

    pub fn get(&mut self, key: u64) -> Option<Option<i64>> {
        let found = self.entries.get(&key).copied();
        if found.is_some() {
            self.hits += 1;
        }
        found
    }

    pub fn insert(&mut self, key: u64, duration: Option<i64>) {
        if self.entries.len() < self.capacity {
            self.entries.insert(key, duration);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }
}
