//! Render directives for the host.
//!
//! The provider answers "what should this path show right now" without ever
//! blocking: cached sizes become a badge, uncached ones start a background
//! request and show a placeholder until the request settles and a change set
//! asks the host to query again.

use std::sync::Arc;

use crate::config::ConfigSnapshot;
use crate::events::{ChangeBus, ChangeSet, FileChange};
use crate::present::present;
use crate::service::SizeService;
use crate::types::PathKey;

pub const PENDING_BADGE: &str = "..";
pub const PENDING_TOOLTIP: &str = "Calculating size…";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoration {
    Badge { badge: String, tooltip: String },
    /// Size not known yet; a request is running.
    Pending,
    /// No decoration at all.
    Suppressed,
}

impl Decoration {
    pub fn badge(&self) -> Option<&str> {
        match self {
            Self::Badge { badge, .. } => Some(badge),
            Self::Pending => Some(PENDING_BADGE),
            Self::Suppressed => None,
        }
    }

    pub fn tooltip(&self) -> Option<&str> {
        match self {
            Self::Badge { tooltip, .. } => Some(tooltip),
            Self::Pending => Some(PENDING_TOOLTIP),
            Self::Suppressed => None,
        }
    }
}

#[derive(Debug)]
pub struct DecorationProvider {
    service: Arc<SizeService>,
    bus: ChangeBus,
}

impl DecorationProvider {
    pub fn new(service: Arc<SizeService>, bus: ChangeBus) -> Self {
        Self { service, bus }
    }

    pub fn service(&self) -> &Arc<SizeService> {
        &self.service
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    /// Must be called from within a Tokio runtime when the path is not cached.
    pub fn provide(&self, path: impl Into<PathKey>) -> Decoration {
        let key = path.into();
        let config = self.service.config();
        if config.is_excluded(&key.file_name()) {
            return Decoration::Suppressed;
        }

        if let Some(entry) = self.service.get_cached(key.clone()) {
            if entry.is_directory() && !config.compute_folders {
                return Decoration::Suppressed;
            }
            let presentation = present(entry.bytes, config.scale);
            return Decoration::Badge {
                badge: presentation.badge,
                tooltip: presentation.label,
            };
        }

        let request = self.service.request_size(key.clone());
        let bus = self.bus.clone();
        tokio::spawn(async move {
            request.await;
            bus.publish(ChangeSet::Paths(vec![key]));
        });

        if config.compute_folders {
            Decoration::Pending
        } else {
            Decoration::Suppressed
        }
    }

    /// Invalidates the changed path and its ancestors and publishes them.
    pub fn handle_change(&self, change: &FileChange) -> Vec<PathKey> {
        log::debug!("{:?} {}", change.kind, change.path);
        let affected = self.service.invalidate(change.path.clone());
        self.bus.publish(ChangeSet::Paths(affected.clone()));
        affected
    }

    /// Like [`handle_change`](Self::handle_change) for a batch, publishing a
    /// single change set.
    pub fn handle_changes(&self, changes: &[FileChange]) -> Vec<PathKey> {
        if changes.is_empty() {
            return Vec::new();
        }
        let affected = self
            .service
            .invalidate_all(changes.iter().map(|change| &change.path));
        self.bus.publish(ChangeSet::Paths(affected.clone()));
        affected
    }

    /// Installs a new configuration. Sizes computed under the old one are
    /// dropped only when folder computation or the exclusions changed.
    ///
    /// Returns whether the caches were cleared.
    pub fn apply_config(&self, config: ConfigSnapshot) -> bool {
        let incoming = config.clone();
        let previous = self.service.update_config(config);
        let clears = previous.affects_sizes(&incoming);
        if clears {
            self.service.clear_caches();
        }
        self.bus.publish(ChangeSet::All);
        clears
    }

    /// Drops everything and asks the host to re-query all paths.
    pub fn reset(&self) {
        self.service.clear_caches();
        self.bus.publish(ChangeSet::All);
    }
}
