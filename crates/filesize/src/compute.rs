//! Recursive size computation.
//!
//! Each directory invocation fans its children out over at most `width`
//! workers that pull indices from a shared cursor, so a slow subtree only
//! occupies one worker while the others drain the rest of the listing. The
//! bound is per directory: nested directories start their own workers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::future::{join_all, BoxFuture};
use futures_util::FutureExt as _;

use crate::config::ConfigSnapshot;
use crate::fs::HostFs;
use crate::types::{Entry, FileKind, PathKey};

/// Computes sizes against one config snapshot.
#[derive(Clone)]
pub struct SizeComputer {
    fs: Arc<dyn HostFs>,
    config: Arc<ConfigSnapshot>,
}

impl std::fmt::Debug for SizeComputer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SizeComputer")
            .field("fs", &"<host fs>")
            .field("config", &self.config)
            .finish()
    }
}

impl SizeComputer {
    pub fn new(fs: Arc<dyn HostFs>, config: Arc<ConfigSnapshot>) -> Self {
        Self { fs, config }
    }

    /// Resolves `path` to an [`Entry`]. Never fails: anything that cannot be
    /// statted is `Entry::unknown()` and unreadable directories count as empty.
    pub fn compute<'a>(&'a self, path: &'a PathKey) -> BoxFuture<'a, Entry> {
        async move {
            let stat = match self.fs.stat(path.as_path()).await {
                Ok(stat) => stat,
                Err(error) => {
                    log::debug!("stat failed for {path}: {error}");
                    return Entry::unknown();
                }
            };

            match stat.kind {
                FileKind::File => Entry::file(stat.size),
                FileKind::Directory => {
                    if !self.config.compute_folders || self.config.is_excluded(&path.file_name()) {
                        return Entry::directory(0);
                    }
                    Entry::directory(self.directory_total(path).await)
                }
                FileKind::Unknown => Entry::unknown(),
            }
        }
        .boxed()
    }

    async fn directory_total(&self, dir: &PathKey) -> u64 {
        let listing = match self.fs.list(dir.as_path()).await {
            Ok(listing) => listing,
            Err(error) => {
                log::debug!("list failed for {dir}: {error}");
                return 0;
            }
        };

        let children: Vec<PathKey> = listing
            .into_iter()
            .filter(|child| {
                !(child.kind == FileKind::Directory && self.config.is_excluded(&child.name))
            })
            .map(|child| dir.join(&child.name))
            .collect();

        let cursor = &AtomicUsize::new(0);
        let children = &children;
        let worker = move || async move {
            let mut subtotal = 0_u64;
            loop {
                let index = cursor.fetch_add(1, Ordering::Relaxed);
                let Some(child) = children.get(index) else {
                    break;
                };
                subtotal = subtotal.saturating_add(self.compute(child).await.bytes);
            }
            subtotal
        };

        let width = self.config.worker_width().min(children.len());
        join_all((0..width).map(|_| worker()))
            .await
            .into_iter()
            .fold(0_u64, u64::saturating_add)
    }
}
