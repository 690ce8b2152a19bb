//! Ancestor invalidation.
//!
//! A change to a path can alter the aggregate size of every directory above
//! it, so eviction walks from the changed path up to the filesystem root.

use std::collections::HashSet;

use crate::cache::{CacheStore, InFlightRegistry};
use crate::types::PathKey;

pub struct InvalidationWalker<'a> {
    cache: &'a CacheStore,
    in_flight: &'a InFlightRegistry,
}

impl<'a> InvalidationWalker<'a> {
    pub fn new(cache: &'a CacheStore, in_flight: &'a InFlightRegistry) -> Self {
        Self { cache, in_flight }
    }

    /// Evicts `path` and each of its ancestors, returning them changed node
    /// first and root last.
    pub fn invalidate(&self, path: &PathKey) -> Vec<PathKey> {
        let mut seen = HashSet::new();
        self.walk(path, &mut seen)
    }

    /// Invalidates a batch of paths. Ancestors shared between paths are
    /// evicted and reported once.
    pub fn invalidate_all<'p, I>(&self, paths: I) -> Vec<PathKey>
    where
        I: IntoIterator<Item = &'p PathKey>,
    {
        let mut seen = HashSet::new();
        let mut affected = Vec::new();
        for path in paths {
            affected.extend(self.walk(path, &mut seen));
        }
        affected
    }

    fn walk(&self, path: &PathKey, seen: &mut HashSet<PathKey>) -> Vec<PathKey> {
        let mut affected = Vec::new();
        let mut current = path.clone();
        while seen.insert(current.clone()) {
            self.cache.remove(&current);
            self.in_flight.remove(&current);
            let parent = current.parent();
            let at_root = parent == current;
            affected.push(current);
            if at_root {
                break;
            }
            current = parent;
        }
        affected
    }
}
