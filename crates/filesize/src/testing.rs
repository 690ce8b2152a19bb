//! In-memory [`HostFs`] for unit tests, with call accounting.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::fs::{DirEntry, FsStat, HostFs};
use crate::types::FileKind;

#[derive(Debug, Default)]
pub struct MemoryFs {
    files: HashMap<PathBuf, u64>,
    dirs: HashMap<PathBuf, BTreeMap<String, FileKind>>,
    unlistable: HashSet<PathBuf>,
    delay: Option<Duration>,
    stat_calls: Mutex<Vec<PathBuf>>,
    list_calls: Mutex<Vec<PathBuf>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn file(mut self, path: &str, size: u64) -> Self {
        let path = PathBuf::from(path);
        self.link_parent(&path, FileKind::File);
        self.files.insert(path, size);
        self
    }

    pub fn dir(mut self, path: &str) -> Self {
        let path = PathBuf::from(path);
        self.link_parent(&path, FileKind::Directory);
        self.dirs.entry(path).or_default();
        self
    }

    /// A directory that stats fine but fails to list.
    pub fn unlistable(mut self, path: &str) -> Self {
        self = self.dir(path);
        self.unlistable.insert(PathBuf::from(path));
        self
    }

    fn link_parent(&mut self, path: &Path, kind: FileKind) {
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return;
        };
        if !self.dirs.contains_key(parent) {
            self.link_parent(parent, FileKind::Directory);
            self.dirs.insert(parent.to_path_buf(), BTreeMap::new());
        }
        self.dirs
            .entry(parent.to_path_buf())
            .or_default()
            .insert(name.to_string_lossy().into_owned(), kind);
    }

    pub fn stat_count(&self, path: &str) -> usize {
        let path = Path::new(path);
        self.stat_calls.lock().iter().filter(|p| *p == path).count()
    }

    pub fn list_count(&self, path: &str) -> usize {
        let path = Path::new(path);
        self.list_calls.lock().iter().filter(|p| *p == path).count()
    }

    pub fn total_list_calls(&self) -> usize {
        self.list_calls.lock().len()
    }

    /// True if any stat or list targeted `prefix` or something below it.
    pub fn touched_below(&self, prefix: &str) -> bool {
        let prefix = Path::new(prefix);
        let stats = self.stat_calls.lock();
        let lists = self.list_calls.lock();
        stats
            .iter()
            .chain(lists.iter())
            .any(|p| p != prefix && p.starts_with(prefix))
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn leave(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl HostFs for MemoryFs {
    async fn stat(&self, path: &Path) -> io::Result<FsStat> {
        self.stat_calls.lock().push(path.to_path_buf());
        self.enter().await;
        self.leave();
        if let Some(size) = self.files.get(path) {
            return Ok(FsStat {
                size: *size,
                kind: FileKind::File,
            });
        }
        if self.dirs.contains_key(path) {
            return Ok(FsStat {
                size: 4096,
                kind: FileKind::Directory,
            });
        }
        Err(io::Error::new(io::ErrorKind::NotFound, "no such entry"))
    }

    async fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        self.list_calls.lock().push(path.to_path_buf());
        self.enter().await;
        self.leave();
        if self.unlistable.contains(path) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        }
        let children = self
            .dirs
            .get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such directory"))?;
        Ok(children
            .iter()
            .map(|(name, kind)| DirEntry {
                name: name.clone(),
                kind: *kind,
            })
            .collect())
    }
}
