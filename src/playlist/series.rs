use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::Playlist;

static EPISODE_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)^(?P<show>.+?)[\s._\-:|]*\bS\d{1,2}\s*E\d{1,4}\b")
            .expect("season/episode pattern is valid"),
        Regex::new(r"(?i)^(?P<show>.+?)[\s._\-:|]+\d{1,2}x\d{1,3}\b")
            .expect("NxM pattern is valid"),
    ]
});

#[derive(Debug, Default)]
pub(crate) struct SeriesSplit {
    pub(crate) series: BTreeMap<String, Playlist>,
    pub(crate) remainder: Playlist,
}

pub(crate) fn show_name(entry_name: &str) -> Option<String> {
    EPISODE_PATTERNS.iter().find_map(|pattern| {
        let captures = pattern.captures(entry_name)?;
        let show = captures
            .name("show")?
            .as_str()
            .trim_end_matches(|ch: char| ch.is_whitespace() || "._-:|".contains(ch))
            .trim();
        (!show.is_empty()).then(|| show.to_string())
    })
}

/// Groups episodic entries by show name; everything else lands in the remainder.
pub(crate) fn detect_series(playlist: &Playlist, exclude_singletons: bool) -> SeriesSplit {
    let mut split = SeriesSplit {
        series: BTreeMap::new(),
        remainder: Playlist::with_attributes(playlist.attributes().clone()),
    };

    for entry in playlist.entries() {
        match show_name(&entry.name) {
            Some(show) => split
                .series
                .entry(show)
                .or_insert_with(|| Playlist::with_attributes(playlist.attributes().clone()))
                .push_shared(entry.clone()),
            None => split.remainder.push_shared(entry.clone()),
        }
    }

    if exclude_singletons {
        let singles: Vec<String> = split
            .series
            .iter()
            .filter(|(_, episodes)| episodes.len() == 1)
            .map(|(show, _)| show.clone())
            .collect();
        for show in singles {
            if let Some(single) = split.series.remove(&show) {
                split.remainder.extend_from(&single);
            }
        }
    }
    split
}
