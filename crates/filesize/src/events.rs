use tokio::sync::broadcast;

use crate::types::PathKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileChangeKind {
    Created,
    Modified,
    Deleted,
}

/// A filesystem change notification from the host or a watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub kind: FileChangeKind,
    pub path: PathKey,
}

impl FileChange {
    pub fn new(kind: FileChangeKind, path: impl Into<PathKey>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// Paths whose decorations should be re-queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSet {
    /// Everything, e.g. after a configuration change.
    All,
    Paths(Vec<PathKey>),
}

/// Fan-out of change sets to registered observers.
///
/// Subscribing registers an observer; dropping the receiver unregisters it.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeSet>,
}

impl ChangeBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeSet> {
        self.sender.subscribe()
    }

    /// Returns the number of observers reached; zero when nobody listens.
    pub fn publish(&self, change: ChangeSet) -> usize {
        self.sender.send(change).unwrap_or(0)
    }

    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(256)
    }
}
