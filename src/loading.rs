//! Aggregate progress of the asset loads.
//!
//! Every load registers itself with [`LoadingManager::item_start`] when it is issued
//! and reports back through [`LoadingManager::item_end`] or
//! [`LoadingManager::item_error`]. The manager turns those reports into
//! [`LoadEvent`]s: a progress report per finished item and a single `Loaded` once
//! every registered item is done.

use std::collections::HashSet;

use anyhow::*;
use log::{debug, error, info};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub loaded: usize,
    pub total: usize,
}

impl ProgressState {
    /// Fraction of finished items. Zero while nothing was registered.
    pub fn ratio(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.loaded.min(self.total) as f32 / self.total as f32
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.loaded >= self.total
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LoadEvent {
    Progress { url: String, state: ProgressState },
    Loaded,
}

#[derive(Debug, Default)]
pub struct LoadingManager {
    state: ProgressState,
    pending: HashSet<String>,
    completed: bool,
}

impl LoadingManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self) -> ProgressState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn item_start(&mut self, url: &str) {
        if self.completed {
            log::warn!("{url} started after loading completed; it will not be tracked");
            return;
        }
        if !self.pending.insert(url.to_string()) {
            log::warn!("{url} is already loading");
            return;
        }
        self.state.total += 1;
        debug!("Loading {url} ({} items registered)", self.state.total);
    }

    /// Records a finished item. Unknown urls are rejected.
    pub fn item_end(&mut self, url: &str) -> Result<Vec<LoadEvent>> {
        if !self.pending.remove(url) {
            bail!("{url} finished loading but was never started");
        }
        self.state.loaded += 1;
        debug!("Loaded {url} ({}/{})", self.state.loaded, self.state.total);

        let mut events = vec![LoadEvent::Progress {
            url: url.to_string(),
            state: self.state,
        }];
        if self.state.is_complete() && !self.completed {
            self.completed = true;
            info!("All {} assets loaded", self.state.total);
            events.push(LoadEvent::Loaded);
        }
        Ok(events)
    }

    /// Records a failed item. Every registered asset is required, so this always
    /// returns the error with the url attached.
    pub fn item_error(&mut self, url: &str, err: Error) -> Error {
        self.pending.remove(url);
        error!("Failed to load {url}: {err:#}");
        err.context(format!("Required asset {url} could not be loaded"))
    }
}
