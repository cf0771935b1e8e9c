use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::playlist::{ExportFormat, Playlist, export_encode};

use super::error;
use super::filter::{Filtered, filter};
use super::groups::GroupIndex;
use super::selection::Selection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExportReport {
    pub(crate) path: PathBuf,
    pub(crate) count: usize,
}

/// One group-selection pass over a snapshot of a playlist.
///
/// The index and candidate labels are built when the session starts, so a
/// selection can only ever name groups of this snapshot. Dropping the session
/// discards the selection.
#[derive(Debug, Clone)]
pub(crate) struct ExportSession {
    source: Playlist,
    index: GroupIndex,
    candidates: Vec<String>,
    selection: Selection,
    exclude: bool,
}

impl ExportSession {
    pub(crate) fn start(playlist: &Playlist, attribute_key: &str) -> Self {
        let index = GroupIndex::build(playlist, attribute_key);
        let candidates = index.labels();
        Self {
            source: playlist.clone(),
            index,
            candidates,
            selection: Selection::new(),
            exclude: false,
        }
    }

    pub(crate) fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub(crate) fn index(&self) -> &GroupIndex {
        &self.index
    }

    pub(crate) fn selection(&self) -> &Selection {
        &self.selection
    }

    pub(crate) fn exclude(&self) -> bool {
        self.exclude
    }

    pub(crate) fn set_exclude(&mut self, exclude: bool) {
        self.exclude = exclude;
    }

    /// Applies a selection expression. On error the selection is unchanged.
    pub(crate) fn apply(&mut self, expression: &str) -> error::Result<()> {
        self.selection = self.selection.apply(&self.candidates, expression)?;
        Ok(())
    }

    /// Entries carrying one of the selected labels.
    pub(crate) fn selected_entry_count(&self) -> usize {
        self.selection
            .iter()
            .map(|label| self.index.count(label))
            .sum()
    }

    /// Entries `finish` would keep.
    pub(crate) fn export_count(&self) -> usize {
        let selected = self.selected_entry_count();
        if self.exclude {
            self.index.entry_count() - selected
        } else {
            selected
        }
    }

    pub(crate) fn finish(&self) -> Filtered {
        filter(&self.source, &self.index, &self.selection, self.exclude)
    }

    pub(crate) fn file_name(&self, format: ExportFormat, timestamp: i64) -> String {
        let labels: Vec<&str> = self.selection.iter().collect();
        export_file_name(Some((labels.as_slice(), self.exclude)), format, timestamp)
    }
}

/// `playlist_<groups>_<selected|excluded>_<ts>.<ext>`, or
/// `playlist_export_<ts>.<ext>` when no group filter applies.
pub(crate) fn export_file_name(
    groups: Option<(&[&str], bool)>,
    format: ExportFormat,
    timestamp: i64,
) -> String {
    let ext = format.extension();
    let Some((labels, exclude)) = groups else {
        return format!("playlist_export_{timestamp}.{ext}");
    };
    let joined = labels.iter().take(3).copied().collect::<Vec<_>>().join("_");
    let groups: String = joined
        .chars()
        .take(30)
        .map(|ch| {
            if ch.is_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    let mode = if exclude { "excluded" } else { "selected" };
    format!("playlist_{groups}_{mode}_{timestamp}.{ext}")
}

pub(crate) fn write_export(
    playlist: &Playlist,
    format: ExportFormat,
    dir: &Path,
    file_name: &str,
) -> Result<ExportReport> {
    let text = export_encode(playlist, format).context("failed to encode playlist")?;
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = dir.join(file_name);
    fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(ExportReport {
        path,
        count: playlist.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::{Entry, GROUP_ATTRIBUTE};

    fn source() -> Playlist {
        ["News", "Sports", "Music", "Sports"]
            .iter()
            .enumerate()
            .map(|(i, group)| {
                Entry::new(format!("ch{i}"), format!("http://s/{i}"))
                    .with_attribute(GROUP_ATTRIBUTE, group)
            })
            .collect()
    }

    #[test]
    fn failed_expression_keeps_previous_selection() {
        let mut session = ExportSession::start(&source(), GROUP_ATTRIBUTE);
        session.apply("1,3").expect("valid");
        let before = session.selection().clone();
        assert!(session.apply("2,banana").is_err());
        assert_eq!(session.selection(), &before);
    }

    #[test]
    fn counts_follow_the_selection() {
        let mut session = ExportSession::start(&source(), GROUP_ATTRIBUTE);
        // candidates: Music, News, Sports
        session.apply("3").expect("valid");
        assert_eq!(session.selected_entry_count(), 2);
        assert_eq!(session.finish().count, 2);

        session.set_exclude(true);
        assert_eq!(session.finish().count, 2);
        assert_eq!(session.export_count(), 2);
        assert_eq!(session.file_name(ExportFormat::Json, 7), "playlist_Sports_excluded_7.json");

        session.apply("1").expect("valid");
        assert_eq!(session.export_count(), 1);
        assert_eq!(session.finish().count, 1);
    }

    #[test]
    fn session_is_a_snapshot() {
        let mut playlist = source();
        let mut session = ExportSession::start(&playlist, GROUP_ATTRIBUTE);
        playlist.push(Entry::new("late", "http://s/late").with_attribute(GROUP_ATTRIBUTE, "News"));
        session.apply("all").expect("valid");
        assert_eq!(session.finish().count, 4);
    }

    #[test]
    fn file_names_are_path_safe_and_bounded() {
        let labels = ["Movies / HD", "Kids", "Docs", "Extra"];
        let name = export_file_name(Some((labels.as_slice(), false)), ExportFormat::M3uPlus, 100);
        assert_eq!(name, "playlist_Movies___HD_Kids_Docs_selected_100.m3u");

        let long = ["A".repeat(50)];
        let long: Vec<&str> = long.iter().map(String::as_str).collect();
        let name = export_file_name(Some((long.as_slice(), false)), ExportFormat::M3u8, 1);
        assert_eq!(name, format!("playlist_{}_selected_1.m3u8", "A".repeat(30)));

        assert_eq!(
            export_file_name(None, ExportFormat::Json, 5),
            "playlist_export_5.json"
        );
    }

    #[test]
    fn writes_encoded_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = ExportSession::start(&source(), GROUP_ATTRIBUTE);
        session.apply("2").expect("valid");
        let filtered = session.finish();

        let report = write_export(
            &filtered.playlist,
            ExportFormat::M3u8,
            &dir.path().join("out"),
            "news.m3u8",
        )
        .expect("export written");
        assert_eq!(report.count, 1);
        let text = fs::read_to_string(&report.path).expect("read back");
        assert_eq!(text, "#EXTM3U\n#EXTINF:-1,ch0\nhttp://s/0\n");
    }
}
