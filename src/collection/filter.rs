use crate::playlist::Playlist;

use super::groups::GroupIndex;
use super::selection::Selection;

#[derive(Debug, Clone)]
pub(crate) struct Filtered {
    pub(crate) playlist: Playlist,
    pub(crate) count: usize,
}

/// Keeps entries whose group is selected (or, with `exclude`, not selected),
/// in source order. Ungrouped entries are never selected, so only `exclude`
/// lets them through. Playlist attributes are copied from the source.
pub(crate) fn filter(
    source: &Playlist,
    index: &GroupIndex,
    selected: &Selection,
    exclude: bool,
) -> Filtered {
    let mut playlist = Playlist::with_attributes(source.attributes().clone());
    for entry in source.entries() {
        let in_selection = entry
            .group(index.attribute_key())
            .is_some_and(|label| selected.contains(label));
        if in_selection != exclude {
            playlist.push_shared(entry.clone());
        }
    }
    let count = playlist.len();
    Filtered { playlist, count }
}
