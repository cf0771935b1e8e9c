mod error;
mod export;
mod filter;
mod groups;
mod history;
mod registry;
mod selection;
mod source;

use chrono::Local;
use tracing::{info, warn};

use crate::playlist::{GROUP_ATTRIBUTE, Playlist, sanitize};

pub(crate) use error::{CollectionError, PersistenceWarning, Result};
pub(crate) use export::{ExportSession, export_file_name, write_export};
pub(crate) use groups::GroupIndex;
pub(crate) use history::{HISTORY_CAP, HistoryEntry, HistoryStore, origin_of};
pub(crate) use registry::{MergeReport, PlaylistHandle, Registry};
pub(crate) use source::{LocationSource, PlaylistSource};

#[derive(Debug, Clone)]
pub(crate) struct LoadOutcome {
    pub(crate) name: String,
    pub(crate) entry_count: usize,
    pub(crate) warning: Option<PersistenceWarning>,
}

/// History, registry and the load path behind one handle.
pub(crate) struct Collection {
    history: HistoryStore,
    registry: Registry,
    source: Box<dyn PlaylistSource>,
}

impl Collection {
    pub(crate) fn new(history: HistoryStore, source: Box<dyn PlaylistSource>) -> Self {
        Self {
            history,
            registry: Registry::new(),
            source,
        }
    }

    pub(crate) fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn current(&self) -> Option<&PlaylistHandle> {
        self.registry.current()
    }

    /// Fetches `location`, registers it and makes it current. Every attempt is
    /// recorded in history; on failure the current playlist is left alone.
    pub(crate) fn load(
        &mut self,
        location: &str,
        sanitize_entries: bool,
        name: Option<&str>,
    ) -> Result<LoadOutcome> {
        let location = location.trim();
        let playlist = match self.source.fetch_and_parse(location) {
            Ok(playlist) if sanitize_entries => sanitize(&playlist),
            Ok(playlist) => playlist,
            Err(err) => {
                warn!(location, "load failed: {err}");
                self.history.record(location, false, 0);
                return Err(err);
            }
        };

        let name = match name.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => self.generate_name(location),
        };
        let entry_count = playlist.len();
        self.registry.put(&name, playlist);
        self.registry.set_current(&name)?;
        let warning = self.history.record(location, true, entry_count);
        info!(location, name = %name, entry_count, "playlist loaded");

        Ok(LoadOutcome {
            name,
            entry_count,
            warning,
        })
    }

    /// Loads each location in turn; one failure does not stop the rest.
    pub(crate) fn load_many(
        &mut self,
        locations: &[String],
        sanitize_entries: bool,
    ) -> Vec<(String, Result<LoadOutcome>)> {
        locations
            .iter()
            .map(|location| {
                let outcome = self.load(location, sanitize_entries, None);
                (location.clone(), outcome)
            })
            .collect()
    }

    /// Reloads the `number`-th (1-based) history entry.
    pub(crate) fn load_from_history(
        &mut self,
        number: usize,
        sanitize_entries: bool,
    ) -> Result<LoadOutcome> {
        let location = self
            .history
            .get(number)
            .map(|entry| entry.location.clone())
            .ok_or_else(|| CollectionError::history_not_found(number))?;
        self.load(&location, sanitize_entries, None)
    }

    pub(crate) fn switch(&mut self, name: &str) -> Result<()> {
        self.registry.set_current(name)
    }

    pub(crate) fn remove(&mut self, name: &str) -> Result<PlaylistHandle> {
        self.registry.remove(name)
    }

    pub(crate) fn merge(&mut self, names: &[String], merged_name: Option<&str>) -> MergeReport {
        let merged_name = match merged_name.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => format!("merged_{}", Local::now().timestamp()),
        };
        let report = self.registry.merge(names, &merged_name);
        if !report.skipped.is_empty() {
            warn!(skipped = ?report.skipped, "merge skipped unknown playlists");
        }
        report
    }

    /// Starts a fresh selection session over the current playlist.
    pub(crate) fn start_export(&self) -> Option<ExportSession> {
        self.current()
            .map(|handle| ExportSession::start(&handle.playlist, GROUP_ATTRIBUTE))
    }

    pub(crate) fn current_playlist(&self) -> Option<&Playlist> {
        self.current().map(|handle| &handle.playlist)
    }

    fn generate_name(&self, location: &str) -> String {
        let origin = origin_of(location);
        let origin = if origin.is_empty() { "local" } else { origin.as_str() };
        let base = format!("{origin}_{}", Local::now().format("%Y%m%d_%H%M%S"));
        if !self.registry.contains(&base) {
            return base;
        }
        (2..)
            .map(|n| format!("{base}_{n}"))
            .find(|candidate| !self.registry.contains(candidate))
            .unwrap_or(base)
    }
}
