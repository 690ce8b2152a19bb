//! File and folder size annotations.
//!
//! This crate provides the size engine behind explorer decorations:
//! - Recursive, per-directory bounded size aggregation
//! - A result cache with de-duplicated in-flight requests
//! - Ancestor invalidation driven by filesystem changes
//! - Compact badge and label presentation of byte counts

pub mod cache;
pub mod compute;
pub mod config;
pub mod decoration;
pub mod error;
pub mod events;
pub mod fs;
pub mod invalidate;
pub mod present;
pub mod service;
pub mod types;
pub mod watcher;

#[cfg(test)]
mod testing;

// Re-export main types
pub use cache::{CacheStore, InFlightRegistry, SizeRequest};
pub use compute::SizeComputer;
pub use config::ConfigSnapshot;
pub use decoration::{Decoration, DecorationProvider};
pub use error::{FilesizeError, Result};
pub use events::{ChangeBus, ChangeSet, FileChange, FileChangeKind};
pub use fs::{DirEntry, FsStat, HostFs, LocalFs};
pub use invalidate::InvalidationWalker;
pub use present::{present, Presentation, Scale};
pub use service::SizeService;
pub use types::{Entry, FileKind, PathKey};
pub use watcher::SizeWatcher;
