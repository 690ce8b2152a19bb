//! Filesystem watching with `notify`.
//!
//! The watcher callback runs on notify's own thread and feeds changes straight
//! into the [`DecorationProvider`]; invalidation only touches the maps and the
//! broadcast channel, so no runtime is needed there. Dropping the
//! [`SizeWatcher`] stops delivery.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::event::ModifyKind;
use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::decoration::DecorationProvider;
use crate::error::{FilesizeError, Result};
use crate::events::{FileChange, FileChangeKind};

/// Maps a notify event kind to a change kind. Access events carry no size
/// change and map to `None`.
pub fn change_kind(kind: &EventKind) -> Option<FileChangeKind> {
    match kind {
        EventKind::Access(_) => None,
        EventKind::Create(_) => Some(FileChangeKind::Created),
        EventKind::Remove(_) => Some(FileChangeKind::Deleted),
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        _ => Some(FileChangeKind::Modified),
    }
}

/// Keeps a `notify` watcher alive for one root.
pub struct SizeWatcher {
    root: PathBuf,
    _watcher: RecommendedWatcher,
}

impl std::fmt::Debug for SizeWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SizeWatcher")
            .field("root", &self.root)
            .field("_watcher", &"<watcher>")
            .finish()
    }
}

impl SizeWatcher {
    /// Watches `root` (recursively when it is a directory, otherwise its
    /// parent) and invalidates sizes through `provider` on every change.
    pub fn start(root: impl Into<PathBuf>, provider: Arc<DecorationProvider>) -> Result<Self> {
        let root = root.into();
        let root_is_dir = std::fs::metadata(&root)
            .map_err(|error| {
                FilesizeError::InvalidInput(format!(
                    "unable to access watch root {}: {error}",
                    root.display()
                ))
            })?
            .is_dir();

        let mut watcher = recommended_watcher(move |event_result: notify::Result<Event>| {
            dispatch(&provider, event_result)
        })
        .map_err(|source| FilesizeError::Watcher {
            path: root.clone(),
            source,
        })?;

        let (watch_target, recursive_mode) = if root_is_dir {
            (root.clone(), RecursiveMode::Recursive)
        } else {
            (
                root.parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.clone()),
                RecursiveMode::NonRecursive,
            )
        };

        watcher
            .watch(&watch_target, recursive_mode)
            .map_err(|source| FilesizeError::Watcher {
                path: watch_target.clone(),
                source,
            })?;
        log::debug!("watching {} for size changes", watch_target.display());

        Ok(Self {
            root,
            _watcher: watcher,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Applies one notify callback to the provider.
///
/// Events without paths mean the backend lost track (e.g. a queue overflow),
/// so every cached size is dropped.
pub(crate) fn dispatch(provider: &DecorationProvider, event_result: notify::Result<Event>) {
    let event = match event_result {
        Ok(event) => event,
        Err(error) => {
            log::warn!("filesystem watcher error: {error}");
            return;
        }
    };
    let Some(kind) = change_kind(&event.kind) else {
        return;
    };
    if event.paths.is_empty() {
        provider.reset();
        return;
    }
    let changes: Vec<FileChange> = event
        .paths
        .into_iter()
        .map(|path| FileChange::new(kind, path))
        .collect();
    provider.handle_changes(&changes);
}

#[cfg(test)]
mod tests {
    use notify::event::{AccessKind, CreateKind, MetadataKind, RemoveKind};

    use super::*;
    use crate::config::ConfigSnapshot;
    use crate::events::{ChangeBus, ChangeSet};
    use crate::service::SizeService;
    use crate::testing::MemoryFs;
    use crate::types::{Entry, PathKey};

    fn provider() -> Arc<DecorationProvider> {
        let fs = MemoryFs::new().file("/r/a", 1).file("/r/sub/b", 2);
        let service = Arc::new(SizeService::new(Arc::new(fs), ConfigSnapshot::default()));
        Arc::new(DecorationProvider::new(service, ChangeBus::new(16)))
    }

    #[test]
    fn maps_event_kinds() {
        assert_eq!(
            change_kind(&EventKind::Create(CreateKind::File)),
            Some(FileChangeKind::Created)
        );
        assert_eq!(
            change_kind(&EventKind::Remove(RemoveKind::Folder)),
            Some(FileChangeKind::Deleted)
        );
        assert_eq!(
            change_kind(&EventKind::Modify(ModifyKind::Any)),
            Some(FileChangeKind::Modified)
        );
        assert_eq!(change_kind(&EventKind::Access(AccessKind::Any)), None);
        assert_eq!(
            change_kind(&EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any))),
            None
        );
    }

    #[tokio::test]
    async fn dispatch_invalidates_event_paths() {
        let provider = provider();
        provider.service().request_size("/r").await;
        provider.service().request_size("/r/a").await;
        let mut rx = provider.bus().subscribe();

        let event = Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("/r/sub/new"));
        dispatch(&provider, Ok(event));

        assert!(provider.service().get_cached("/r").is_none());
        assert_eq!(provider.service().get_cached("/r/a"), Some(Entry::file(1)));
        assert_eq!(
            rx.recv().await.expect("recv"),
            ChangeSet::Paths(vec![
                PathKey::new("/r/sub/new"),
                PathKey::new("/r/sub"),
                PathKey::new("/r"),
                PathKey::new("/"),
            ])
        );
    }

    #[tokio::test]
    async fn pathless_event_resets_everything() {
        let provider = provider();
        provider.service().request_size("/r/a").await;
        let mut rx = provider.bus().subscribe();

        dispatch(&provider, Ok(Event::new(EventKind::Other)));

        assert_eq!(provider.service().cached_len(), 0);
        assert_eq!(rx.recv().await.expect("recv"), ChangeSet::All);
    }

    #[tokio::test]
    async fn access_events_are_ignored() {
        let provider = provider();
        provider.service().request_size("/r/a").await;

        let event = Event::new(EventKind::Access(AccessKind::Any)).add_path(PathBuf::from("/r/a"));
        dispatch(&provider, Ok(event));

        assert_eq!(provider.service().cached_len(), 1);
    }

    #[test]
    fn start_rejects_missing_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = SizeWatcher::start(dir.path().join("missing"), provider()).unwrap_err();
        assert!(matches!(err, FilesizeError::InvalidInput(_)));
    }

    #[test]
    fn start_watches_existing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let watcher = SizeWatcher::start(dir.path(), provider()).expect("watch");
        assert_eq!(watcher.root(), dir.path());
    }
}
