//! Size computation settings.
//!
//! A [`ConfigSnapshot`] is immutable once built. The service holds the active
//! snapshot behind an `Arc` and swaps it whole; computations capture the
//! snapshot that was active when they started.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FilesizeError, Result};
use crate::present::Scale;

pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_EXCLUDED_FOLDERS: [&str; 4] = ["node_modules", ".git", "venv", ".venv"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigSnapshot {
    /// When false, directories resolve to zero bytes without being listed.
    pub compute_folders: bool,
    /// Directory names that are never descended into.
    pub exclude_folders: HashSet<String>,
    pub scale: Scale,
    /// Worker width for each directory fan-out.
    pub concurrency: usize,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            compute_folders: true,
            exclude_folders: DEFAULT_EXCLUDED_FOLDERS
                .iter()
                .map(|name| name.to_string())
                .collect(),
            scale: Scale::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl ConfigSnapshot {
    pub fn from_json(raw: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(raw)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn with_compute_folders(mut self, compute_folders: bool) -> Self {
        self.compute_folders = compute_folders;
        self
    }

    pub fn with_excluded<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_folders = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude_folders.contains(name)
    }

    /// Worker width, never below one.
    pub fn worker_width(&self) -> usize {
        self.concurrency.max(1)
    }

    /// True when switching from `self` to `other` invalidates cached sizes.
    ///
    /// The scale only affects presentation, so it is not considered.
    pub fn affects_sizes(&self, other: &ConfigSnapshot) -> bool {
        self.compute_folders != other.compute_folders
            || self.exclude_folders != other.exclude_folders
    }

    fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(FilesizeError::InvalidInput(
                "concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
