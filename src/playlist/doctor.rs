use tracing::debug;

use super::{Attributes, Entry, Playlist};

/// Repairs common defects. Applying it twice yields the same playlist.
pub(crate) fn sanitize(playlist: &Playlist) -> Playlist {
    let mut repaired = Playlist::with_attributes(clean_attributes(playlist.attributes()));
    let mut dropped = 0usize;

    for entry in playlist.entries() {
        match clean_entry(entry) {
            Some(entry) => repaired.push(entry),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(dropped, "sanitize dropped entries without a URL");
    }
    repaired
}

fn clean_entry(entry: &Entry) -> Option<Entry> {
    let url = entry.url.trim();
    if url.is_empty() {
        return None;
    }

    let attributes = clean_attributes(&entry.attributes);
    let mut name = entry.name.trim().to_string();
    if name.is_empty() {
        name = attributes
            .get("tvg-name")
            .filter(|value| !value.is_empty())
            .unwrap_or(url)
            .to_string();
    }

    Some(Entry {
        name,
        url: url.to_string(),
        duration: entry.duration,
        attributes,
    })
}

fn clean_attributes(attributes: &Attributes) -> Attributes {
    attributes
        .iter()
        .map(|(key, value)| (key.trim().to_ascii_lowercase(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}
