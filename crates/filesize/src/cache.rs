//! Resolved sizes and in-flight computations, both keyed by [`PathKey`].
//!
//! Locks are only held for single map operations and never across an
//! `.await`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::future::{BoxFuture, Shared};
use parking_lot::Mutex;

use crate::types::{Entry, PathKey};

/// A pending size computation. Cloning it attaches another waiter; every
/// waiter resolves to the same [`Entry`].
pub type SizeRequest = Shared<BoxFuture<'static, Entry>>;

/// Last known entry per path.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: Mutex<HashMap<PathKey, Entry>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &PathKey) -> Option<Entry> {
        self.entries.lock().get(key).copied()
    }

    pub fn insert(&self, key: PathKey, entry: Entry) {
        self.entries.lock().insert(key, entry);
    }

    pub fn remove(&self, key: &PathKey) -> Option<Entry> {
        self.entries.lock().remove(key)
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

struct Pending {
    id: u64,
    request: SizeRequest,
}

/// At most one pending computation per path.
///
/// Every registration gets a fresh id so a computation that settles after its
/// slot was evicted (and possibly re-filled by a newer request) only removes
/// its own slot.
#[derive(Default)]
pub struct InFlightRegistry {
    pending: Mutex<HashMap<PathKey, Pending>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for InFlightRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InFlightRegistry")
            .field("pending", &self.len())
            .finish()
    }
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pending request for `key`, or registers the one built by
    /// `start`. `start` receives the registration id and runs under the
    /// registry lock, so the check and the insert are one step.
    pub fn get_or_register<F>(&self, key: &PathKey, start: F) -> SizeRequest
    where
        F: FnOnce(u64) -> SizeRequest,
    {
        let mut pending = self.pending.lock();
        if let Some(existing) = pending.get(key) {
            return existing.request.clone();
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = start(id);
        pending.insert(
            key.clone(),
            Pending {
                id,
                request: request.clone(),
            },
        );
        request
    }

    pub fn remove(&self, key: &PathKey) -> bool {
        self.pending.lock().remove(key).is_some()
    }

    /// Removes the slot for `key` only if it still holds registration `id`.
    pub fn remove_if_current(&self, key: &PathKey, id: u64) -> bool {
        let mut pending = self.pending.lock();
        match pending.get(key) {
            Some(slot) if slot.id == id => {
                pending.remove(key);
                true
            }
            _ => false,
        }
    }

    pub fn clear(&self) {
        self.pending.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}
