//! Core value types shared by the cache, the computer and the host adapters.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Kind of a filesystem entry as far as size computation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Directory,
    Unknown,
}

/// Last known size of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub bytes: u64,
    pub kind: FileKind,
}

impl Entry {
    pub fn file(bytes: u64) -> Self {
        Self {
            bytes,
            kind: FileKind::File,
        }
    }

    pub fn directory(bytes: u64) -> Self {
        Self {
            bytes,
            kind: FileKind::Directory,
        }
    }

    /// Fallback for anything that could not be statted.
    pub fn unknown() -> Self {
        Self {
            bytes: 0,
            kind: FileKind::Unknown,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == FileKind::Directory
    }
}

/// Canonical identity of a path, used as the key of every map in the crate.
///
/// Normalisation is purely lexical: repeated and trailing separators and `.`
/// components are dropped. `..` is kept as-is since collapsing it is only
/// correct when no symlink is involved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathKey {
    path: PathBuf,
}

impl PathKey {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let mut normalized = PathBuf::new();
        for component in path.as_ref().components() {
            match component {
                Component::CurDir => {}
                other => normalized.push(other.as_os_str()),
            }
        }
        if normalized.as_os_str().is_empty() {
            normalized.push(".");
        }
        Self { path: normalized }
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Lexical parent, or the key itself when it has none (a filesystem root
    /// or a single relative component).
    pub fn parent(&self) -> PathKey {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Self {
                path: parent.to_path_buf(),
            },
            _ => self.clone(),
        }
    }

    /// Last component, or the whole path for roots.
    pub fn file_name(&self) -> String {
        match self.path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => self.path.to_string_lossy().into_owned(),
        }
    }

    pub fn join(&self, name: &str) -> PathKey {
        Self {
            path: self.path.join(name),
        }
    }

    /// Number of components below the root, e.g. `/a/b` has depth 2.
    pub fn depth(&self) -> usize {
        self.path
            .components()
            .filter(|component| matches!(component, Component::Normal(_) | Component::ParentDir))
            .count()
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl From<&Path> for PathKey {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

impl From<PathBuf> for PathKey {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&str> for PathKey {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl AsRef<Path> for PathKey {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}
