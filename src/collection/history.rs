use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use super::error::PersistenceWarning;

pub(crate) const HISTORY_CAP: usize = 50;

/// One load attempt. `location` is the identity key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct HistoryEntry {
    #[serde(alias = "url")]
    pub(crate) location: String,
    pub(crate) timestamp: f64,
    pub(crate) success: bool,
    #[serde(alias = "channel_count", default)]
    pub(crate) entry_count: usize,
    #[serde(alias = "domain", default)]
    pub(crate) origin: String,
}

impl HistoryEntry {
    pub(crate) fn new(location: &str, success: bool, entry_count: usize, timestamp: f64) -> Self {
        Self {
            location: location.to_string(),
            timestamp,
            success,
            entry_count,
            origin: origin_of(location),
        }
    }
}

/// Host (with port, when explicit) of a URL-shaped location; empty otherwise.
pub(crate) fn origin_of(location: &str) -> String {
    let Ok(url) = Url::parse(location.trim()) else {
        return String::new();
    };
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}

pub(crate) fn unix_now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Most-recent-first list of load attempts, at most one per location.
#[derive(Debug, Default)]
pub(crate) struct HistoryStore {
    entries: Vec<HistoryEntry>,
    path: Option<PathBuf>,
}

impl HistoryStore {
    /// In-memory store that never touches the disk.
    #[cfg(test)]
    pub(crate) fn in_memory() -> Self {
        Self::default()
    }

    /// Reads `path` if it exists. Unreadable files yield an empty store plus a warning.
    pub(crate) fn open(path: &Path) -> (Self, Option<PersistenceWarning>) {
        let mut store = Self {
            entries: Vec::new(),
            path: Some(path.to_path_buf()),
        };
        if !path.exists() {
            return (store, None);
        }

        let loaded = fs::read_to_string(path)
            .map_err(|err| err.to_string())
            .and_then(|raw| {
                serde_json::from_str::<Vec<HistoryEntry>>(&raw).map_err(|err| err.to_string())
            });
        match loaded {
            Ok(entries) => {
                store.entries = normalize(entries);
                debug!(count = store.entries.len(), path = %path.display(), "loaded URL history");
                (store, None)
            }
            Err(err) => {
                let warning = PersistenceWarning {
                    path: path.to_path_buf(),
                    message: format!("failed to read URL history: {err}"),
                };
                warn!("{warning}");
                (store, Some(warning))
            }
        }
    }

    pub(crate) fn record(
        &mut self,
        location: &str,
        success: bool,
        entry_count: usize,
    ) -> Option<PersistenceWarning> {
        self.insert(HistoryEntry::new(
            location,
            success,
            entry_count,
            unix_now_secs(),
        ));
        self.save()
    }

    /// Pure in-memory half of `record`.
    pub(crate) fn insert(&mut self, entry: HistoryEntry) {
        self.entries.retain(|existing| existing.location != entry.location);
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_CAP);
    }

    pub(crate) fn list(&self, limit: usize) -> &[HistoryEntry] {
        &self.entries[..limit.min(self.entries.len())]
    }

    /// 1-based lookup matching the numbered history menu.
    pub(crate) fn get(&self, number: usize) -> Option<&HistoryEntry> {
        number.checked_sub(1).and_then(|idx| self.entries.get(idx))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn save(&self) -> Option<PersistenceWarning> {
        let path = self.path.as_deref()?;
        match write_atomically(path, &self.entries) {
            Ok(()) => None,
            Err(err) => {
                let warning = PersistenceWarning {
                    path: path.to_path_buf(),
                    message: format!("failed to save URL history: {err}"),
                };
                warn!("{warning}");
                Some(warning)
            }
        }
    }
}

/// Re-applies dedup and cap to entries read from disk.
fn normalize(entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    let mut out: Vec<HistoryEntry> = Vec::with_capacity(entries.len().min(HISTORY_CAP));
    for entry in entries {
        if out.len() == HISTORY_CAP {
            break;
        }
        if out.iter().all(|kept| kept.location != entry.location) {
            out.push(entry);
        }
    }
    out
}

fn write_atomically(path: &Path, entries: &[HistoryEntry]) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, entries)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}
