use std::collections::{BTreeMap, HashMap, HashSet};

use regex::RegexBuilder;

use super::{GROUP_ATTRIBUTE, Playlist, detect_series};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Overview {
    pub(crate) entries: usize,
    pub(crate) groups: usize,
    pub(crate) unique_urls: usize,
    pub(crate) series: usize,
    pub(crate) playlist_attributes: usize,
}

pub(crate) fn overview(playlist: &Playlist) -> Overview {
    let groups: HashSet<Option<&str>> = playlist
        .entries()
        .iter()
        .map(|entry| entry.group(GROUP_ATTRIBUTE))
        .collect();
    let urls: HashSet<&str> = playlist
        .entries()
        .iter()
        .map(|entry| entry.url.as_str())
        .collect();

    Overview {
        entries: playlist.len(),
        groups: groups.len(),
        unique_urls: urls.len(),
        series: detect_series(playlist, false).series.len(),
        playlist_attributes: playlist.attributes().len(),
    }
}

/// Counts per `tvg-*` attribute, most used first.
pub(crate) fn tvg_tag_counts(playlist: &Playlist) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for entry in playlist.entries() {
        for (key, _) in entry.attributes.iter() {
            if key.starts_with("tvg-") {
                *counts.entry(key).or_insert(0) += 1;
            }
        }
    }
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(key, count)| (key.to_string(), count))
        .collect();
    out.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(&right.0)));
    out
}

pub(crate) fn tvg_tag_description(tag: &str) -> &'static str {
    match tag {
        "tvg-id" => "Channel ID for EPG",
        "tvg-name" => "Channel name for EPG",
        "tvg-logo" => "Channel logo URL",
        "tvg-language" => "Channel language",
        "tvg-country" => "Channel country",
        "tvg-url" => "EPG source URL",
        "tvg-shift" => "EPG time shift",
        "tvg-chno" => "Channel number",
        "tvg-rec" => "Recording capability",
        _ => "Unknown tag",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SearchFields {
    pub(crate) name: bool,
    pub(crate) group: bool,
}

impl Default for SearchFields {
    fn default() -> Self {
        Self {
            name: true,
            group: true,
        }
    }
}

/// Regex search over entry names and group labels, keeping playlist attributes.
pub(crate) fn search(
    playlist: &Playlist,
    pattern: &str,
    fields: SearchFields,
    case_sensitive: bool,
) -> Result<Playlist, regex::Error> {
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .build()?;

    let mut found = Playlist::with_attributes(playlist.attributes().clone());
    for entry in playlist.entries() {
        let name_hit = fields.name && regex.is_match(&entry.name);
        let group_hit = fields.group
            && entry
                .group(GROUP_ATTRIBUTE)
                .is_some_and(|group| regex.is_match(group));
        if name_hit || group_hit {
            found.push_shared(entry.clone());
        }
    }
    Ok(found)
}

/// Entry counts per group label (ungrouped excluded), largest first.
pub(crate) fn top_groups(playlist: &Playlist, limit: usize) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in playlist.entries() {
        if let Some(group) = entry.group(GROUP_ATTRIBUTE) {
            *counts.entry(group).or_insert(0) += 1;
        }
    }
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(group, count)| (group.to_string(), count))
        .collect();
    out.sort_by(|left, right| right.1.cmp(&left.1));
    out.truncate(limit);
    out
}
