//! Host filesystem seam.
//!
//! The computer only needs `stat` and `list`. [`LocalFs`] answers them from
//! the local disk through `tokio::fs`; tests substitute an in-memory tree.

use std::io;
use std::path::Path;

use async_trait::async_trait;

use crate::types::FileKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStat {
    pub size: u64,
    pub kind: FileKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: FileKind,
}

#[async_trait]
pub trait HostFs: Send + Sync + 'static {
    async fn stat(&self, path: &Path) -> io::Result<FsStat>;

    async fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>>;
}

/// Local disk through `tokio::fs`.
///
/// Symlinks are reported as [`FileKind::Unknown`] and never followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

fn kind_of(file_type: std::fs::FileType) -> FileKind {
    if file_type.is_file() {
        FileKind::File
    } else if file_type.is_dir() {
        FileKind::Directory
    } else {
        FileKind::Unknown
    }
}

#[async_trait]
impl HostFs for LocalFs {
    async fn stat(&self, path: &Path) -> io::Result<FsStat> {
        let metadata = tokio::fs::symlink_metadata(path).await?;
        Ok(FsStat {
            size: metadata.len(),
            kind: kind_of(metadata.file_type()),
        })
    }

    async fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut reader = tokio::fs::read_dir(path).await?;
        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let kind = match entry.file_type().await {
                Ok(file_type) => kind_of(file_type),
                Err(_) => FileKind::Unknown,
            };
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }
        Ok(entries)
    }
}
