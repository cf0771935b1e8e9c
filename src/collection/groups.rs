use std::collections::BTreeMap;
use std::fmt;

use crate::playlist::Playlist;

/// Bucket key: a named group, or the reserved bucket for entries without one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum GroupKey {
    Named(String),
    Ungrouped,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(label) => f.write_str(label),
            Self::Ungrouped => f.write_str("(no group)"),
        }
    }
}

/// Entry positions of one playlist bucketed by group label.
///
/// Every position of the source playlist lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct GroupIndex {
    attribute_key: String,
    named: BTreeMap<String, Vec<usize>>,
    ungrouped: Vec<usize>,
    entry_count: usize,
}

impl GroupIndex {
    pub(crate) fn build(playlist: &Playlist, attribute_key: &str) -> Self {
        let mut index = Self {
            attribute_key: attribute_key.to_string(),
            named: BTreeMap::new(),
            ungrouped: Vec::new(),
            entry_count: playlist.len(),
        };
        for (position, entry) in playlist.entries().iter().enumerate() {
            match entry.group(attribute_key) {
                Some(label) => index
                    .named
                    .entry(label.to_string())
                    .or_default()
                    .push(position),
                None => index.ungrouped.push(position),
            }
        }
        index
    }

    pub(crate) fn attribute_key(&self) -> &str {
        &self.attribute_key
    }

    /// Named labels in sorted order; this ordering backs the 1-based selection menu.
    pub(crate) fn labels(&self) -> Vec<String> {
        self.named.keys().cloned().collect()
    }

    pub(crate) fn count(&self, label: &str) -> usize {
        self.named.get(label).map(Vec::len).unwrap_or(0)
    }

    /// All buckets, named ones first in label order, then the ungrouped bucket if non-empty.
    pub(crate) fn buckets(&self) -> impl Iterator<Item = (GroupKey, &[usize])> {
        let named = self
            .named
            .iter()
            .map(|(label, positions)| (GroupKey::Named(label.clone()), positions.as_slice()));
        let ungrouped = (!self.ungrouped.is_empty())
            .then(|| (GroupKey::Ungrouped, self.ungrouped.as_slice()));
        named.chain(ungrouped)
    }

    pub(crate) fn entry_count(&self) -> usize {
        self.entry_count
    }
}
