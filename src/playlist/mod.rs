mod analysis;
mod doctor;
mod encode;
mod m3u;
mod series;

use std::rc::Rc;

pub(crate) use analysis::*;
pub(crate) use doctor::sanitize;
pub(crate) use encode::{ExportFormat, export_encode};
pub(crate) use m3u::parse_m3u;
pub(crate) use series::detect_series;

/// Attribute carrying an entry's group label.
pub(crate) const GROUP_ATTRIBUTE: &str = "group-title";

/// Key/value attributes in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Attributes {
    pairs: Vec<(String, String)>,
}

impl Attributes {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replaces the value in place when `key` exists, otherwise appends.
    pub(crate) fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn len(&self) -> usize {
        self.pairs.len()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (key, value) in iter {
            attributes.set(key, value);
        }
        attributes
    }
}

/// One media item. Treated as an immutable value once it is in a playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry {
    pub(crate) name: String,
    pub(crate) url: String,
    pub(crate) duration: i64,
    pub(crate) attributes: Attributes,
}

impl Entry {
    pub(crate) fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            duration: -1,
            attributes: Attributes::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.set(key, value);
        self
    }

    /// Group label, `None` when the attribute is missing or blank.
    pub(crate) fn group(&self, attribute_key: &str) -> Option<&str> {
        self.attributes
            .get(attribute_key)
            .filter(|value| !value.trim().is_empty())
    }
}

/// Cloning copies the playlist-level attributes and shares the entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Playlist {
    attributes: Attributes,
    entries: Vec<Rc<Entry>>,
}

impl Playlist {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_attributes(attributes: Attributes) -> Self {
        Self {
            attributes,
            entries: Vec::new(),
        }
    }

    pub(crate) fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[cfg(test)]
    pub(crate) fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    pub(crate) fn entries(&self) -> &[Rc<Entry>] {
        &self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push(&mut self, entry: Entry) {
        self.entries.push(Rc::new(entry));
    }

    pub(crate) fn push_shared(&mut self, entry: Rc<Entry>) {
        self.entries.push(entry);
    }

    pub(crate) fn extend_from(&mut self, other: &Playlist) {
        self.entries.extend(other.entries.iter().cloned());
    }
}

impl FromIterator<Entry> for Playlist {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self {
            attributes: Attributes::new(),
            entries: iter.into_iter().map(Rc::new).collect(),
        }
    }
}
