use crate::playlist::Playlist;

use super::error::{CollectionError, Result};

#[derive(Debug, Clone)]
pub(crate) struct PlaylistHandle {
    pub(crate) name: String,
    pub(crate) playlist: Playlist,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MergeReport {
    pub(crate) name: String,
    pub(crate) merged: Vec<String>,
    pub(crate) skipped: Vec<String>,
    pub(crate) entry_count: usize,
}

/// Session-scoped named playlists, kept in insertion order.
///
/// `current` refers to a playlist by name and is cleared when that playlist
/// is removed, so it can never point at a missing handle.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    handles: Vec<PlaylistHandle>,
    current: Option<String>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores `playlist` under `name`. An existing handle is replaced in place,
    /// keeping its position and, if it was current, its current status.
    pub(crate) fn put(&mut self, name: &str, playlist: Playlist) {
        match self.position(name) {
            Some(idx) => self.handles[idx].playlist = playlist,
            None => self.handles.push(PlaylistHandle {
                name: name.to_string(),
                playlist,
            }),
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Playlist> {
        self.position(name).map(|idx| &self.handles[idx].playlist)
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub(crate) fn remove(&mut self, name: &str) -> Result<PlaylistHandle> {
        let idx = self
            .position(name)
            .ok_or_else(|| CollectionError::playlist_not_found(name))?;
        if self.current.as_deref() == Some(name) {
            self.current = None;
        }
        Ok(self.handles.remove(idx))
    }

    pub(crate) fn set_current(&mut self, name: &str) -> Result<()> {
        if !self.contains(name) {
            return Err(CollectionError::playlist_not_found(name));
        }
        self.current = Some(name.to_string());
        Ok(())
    }

    pub(crate) fn current(&self) -> Option<&PlaylistHandle> {
        let name = self.current.as_deref()?;
        self.position(name).map(|idx| &self.handles[idx])
    }

    pub(crate) fn current_name(&self) -> Option<&str> {
        self.current().map(|handle| handle.name.as_str())
    }

    pub(crate) fn list(&self) -> &[PlaylistHandle] {
        &self.handles
    }

    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Concatenates the named playlists in order. Missing names are skipped and
    /// reported; the result is stored under `merged_name` and becomes current.
    pub(crate) fn merge(&mut self, names: &[String], merged_name: &str) -> MergeReport {
        let mut merged = Playlist::new();
        let mut report = MergeReport {
            name: merged_name.to_string(),
            merged: Vec::new(),
            skipped: Vec::new(),
            entry_count: 0,
        };

        for name in names {
            match self.get(name) {
                Some(playlist) => {
                    merged.extend_from(playlist);
                    report.merged.push(name.clone());
                }
                None => report.skipped.push(name.clone()),
            }
        }

        report.entry_count = merged.len();
        self.put(merged_name, merged);
        self.current = Some(merged_name.to_string());
        report
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.handles.iter().position(|handle| handle.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::Entry;

    fn playlist_of(len: usize, tag: &str) -> Playlist {
        (0..len)
            .map(|i| Entry::new(format!("{tag}-{i}"), format!("http://{tag}/{i}")))
            .collect()
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn put_preserves_insertion_order_and_overwrites_in_place() {
        let mut registry = Registry::new();
        registry.put("a", playlist_of(1, "a"));
        registry.put("b", playlist_of(2, "b"));
        registry.put("a", playlist_of(3, "a2"));

        let listed: Vec<_> = registry.list().iter().map(|h| h.name.as_str()).collect();
        assert_eq!(listed, vec!["a", "b"]);
        assert_eq!(registry.get("a").map(Playlist::len), Some(3));
    }

    #[test]
    fn overwriting_current_keeps_it_current() {
        let mut registry = Registry::new();
        registry.put("a", playlist_of(1, "a"));
        registry.set_current("a").expect("a exists");
        registry.put("a", playlist_of(4, "a"));

        let current = registry.current().expect("still current");
        assert_eq!(current.name, "a");
        assert_eq!(current.playlist.len(), 4);
    }

    #[test]
    fn put_does_not_change_current() {
        let mut registry = Registry::new();
        registry.put("a", playlist_of(1, "a"));
        registry.set_current("a").expect("a exists");
        registry.put("b", playlist_of(1, "b"));
        assert_eq!(registry.current_name(), Some("a"));
    }

    #[test]
    fn set_current_rejects_unknown_name() {
        let mut registry = Registry::new();
        let err = registry.set_current("ghost").expect_err("unknown name");
        assert!(matches!(err, CollectionError::NotFound { .. }));
        assert!(registry.current().is_none());
    }

    #[test]
    fn removing_current_clears_pointer() {
        let mut registry = Registry::new();
        registry.put("a", playlist_of(1, "a"));
        registry.put("b", playlist_of(1, "b"));
        registry.set_current("a").expect("a exists");

        registry.remove("b").expect("b exists");
        assert_eq!(registry.current_name(), Some("a"));

        registry.remove("a").expect("a exists");
        assert!(registry.current().is_none());
        assert!(matches!(
            registry.remove("a"),
            Err(CollectionError::NotFound { .. })
        ));
    }

    #[test]
    fn merge_concatenates_in_given_order() {
        let mut registry = Registry::new();
        registry.put("three", playlist_of(3, "x"));
        registry.put("five", playlist_of(5, "y"));

        let report = registry.merge(&names(&["three", "five"]), "merged");
        assert_eq!(report.entry_count, 8);
        assert!(report.skipped.is_empty());

        let merged = registry.current().expect("merged is current");
        assert_eq!(merged.name, "merged");
        let urls: Vec<_> = merged.playlist.entries().iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls[0], "http://x/0");
        assert_eq!(urls[2], "http://x/2");
        assert_eq!(urls[3], "http://y/0");
        assert_eq!(urls[7], "http://y/4");
    }

    #[test]
    fn merge_of_nothing_registers_empty_playlist() {
        let mut registry = Registry::new();
        let report = registry.merge(&[], "empty");
        assert_eq!(report.entry_count, 0);
        assert_eq!(registry.get("empty").map(Playlist::len), Some(0));

        let report = registry.merge(&names(&["missing", "gone"]), "still-empty");
        assert_eq!(report.skipped, names(&["missing", "gone"]));
        assert_eq!(registry.get("still-empty").map(Playlist::len), Some(0));
        assert_eq!(registry.current_name(), Some("still-empty"));
    }

    #[test]
    fn merge_skips_missing_names() {
        let mut registry = Registry::new();
        registry.put("a", playlist_of(2, "a"));
        let report = registry.merge(&names(&["a", "missing"]), "m");
        assert_eq!(report.merged, names(&["a"]));
        assert_eq!(report.skipped, names(&["missing"]));
        assert_eq!(report.entry_count, 2);
    }

    #[test]
    fn merged_result_is_independent_of_sources() {
        let mut registry = Registry::new();
        registry.put("a", playlist_of(2, "a"));
        registry.merge(&names(&["a"]), "m");
        registry.put("a", playlist_of(7, "a"));
        assert_eq!(registry.get("m").map(Playlist::len), Some(2));
    }
}
