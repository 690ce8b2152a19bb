//! SizeService - cached, de-duplicated size requests.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt as _;
use parking_lot::RwLock;

use crate::cache::{CacheStore, InFlightRegistry, SizeRequest};
use crate::compute::SizeComputer;
use crate::config::ConfigSnapshot;
use crate::fs::{HostFs, LocalFs};
use crate::invalidate::InvalidationWalker;
use crate::types::{Entry, PathKey};

pub struct SizeService {
    fs: Arc<dyn HostFs>,
    config: RwLock<Arc<ConfigSnapshot>>,
    cache: Arc<CacheStore>,
    in_flight: Arc<InFlightRegistry>,
}

impl std::fmt::Debug for SizeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SizeService")
            .field("config", &self.config())
            .field("cached", &self.cache.len())
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

impl SizeService {
    pub fn new(fs: Arc<dyn HostFs>, config: ConfigSnapshot) -> Self {
        Self {
            fs,
            config: RwLock::new(Arc::new(config)),
            cache: Arc::new(CacheStore::new()),
            in_flight: Arc::new(InFlightRegistry::new()),
        }
    }

    /// Service backed by the local disk.
    pub fn local(config: ConfigSnapshot) -> Self {
        Self::new(Arc::new(LocalFs), config)
    }

    pub fn config(&self) -> Arc<ConfigSnapshot> {
        self.config.read().clone()
    }

    /// Swaps the active snapshot. Cached and in-flight results are left alone;
    /// callers that know the change invalidates them call [`clear_caches`].
    ///
    /// [`clear_caches`]: Self::clear_caches
    pub fn update_config(&self, config: ConfigSnapshot) -> Arc<ConfigSnapshot> {
        std::mem::replace(&mut *self.config.write(), Arc::new(config))
    }

    pub fn get_cached(&self, path: impl Into<PathKey>) -> Option<Entry> {
        self.cache.get(&path.into())
    }

    /// Starts (or joins) the computation for `path`.
    ///
    /// The computation runs as its own Tokio task, so it settles and fills the
    /// cache whether or not the returned request is awaited. Must be called
    /// from within a Tokio runtime.
    pub fn request_size(&self, path: impl Into<PathKey>) -> SizeRequest {
        let key = path.into();
        self.in_flight.get_or_register(&key, |id| {
            let computer = SizeComputer::new(self.fs.clone(), self.config());
            let cache = self.cache.clone();
            let in_flight = self.in_flight.clone();
            let key = key.clone();

            let task = tokio::spawn(async move {
                let entry = match AssertUnwindSafe(computer.compute(&key))
                    .catch_unwind()
                    .await
                {
                    Ok(entry) => entry,
                    Err(_) => {
                        log::warn!("size computation panicked for {key}");
                        Entry::unknown()
                    }
                };
                cache.insert(key.clone(), entry);
                in_flight.remove_if_current(&key, id);
                entry
            });

            async move { task.await.unwrap_or_else(|_| Entry::unknown()) }
                .boxed()
                .shared()
        })
    }

    /// Empties both maps. Running computations are not cancelled and still
    /// write their result when they settle.
    pub fn clear_caches(&self) {
        self.cache.clear();
        self.in_flight.clear();
    }

    /// Evicts `path` and its ancestors; see [`InvalidationWalker`].
    pub fn invalidate(&self, path: impl Into<PathKey>) -> Vec<PathKey> {
        InvalidationWalker::new(&self.cache, &self.in_flight).invalidate(&path.into())
    }

    pub fn invalidate_all<'p, I>(&self, paths: I) -> Vec<PathKey>
    where
        I: IntoIterator<Item = &'p PathKey>,
    {
        InvalidationWalker::new(&self.cache, &self.in_flight).invalidate_all(paths)
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }
}
