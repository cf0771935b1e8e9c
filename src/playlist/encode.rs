use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use super::{Attributes, Entry, Playlist};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExportFormat {
    Json,
    /// Extended M3U, entry attributes included.
    M3uPlus,
    /// Plain M3U, names and URLs only.
    M3u8,
}

impl ExportFormat {
    pub(crate) const ALL: [ExportFormat; 3] = [Self::Json, Self::M3uPlus, Self::M3u8];

    pub(crate) fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::M3uPlus => "m3u",
            Self::M3u8 => "m3u8",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "m3u" | "m3u_plus" | "m3u-plus" => Ok(Self::M3uPlus),
            "m3u8" => Ok(Self::M3u8),
            other => Err(format!("unsupported format '{other}' (use json, m3u or m3u8)")),
        }
    }
}

#[derive(Serialize)]
struct JsonPlaylist<'a> {
    attributes: Value,
    channels: Vec<JsonEntry<'a>>,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    name: &'a str,
    duration: i64,
    url: &'a str,
    attributes: Value,
}

pub(crate) fn export_encode(playlist: &Playlist, format: ExportFormat) -> serde_json::Result<String> {
    match format {
        ExportFormat::Json => encode_json(playlist),
        ExportFormat::M3uPlus => Ok(encode_m3u(playlist, true)),
        ExportFormat::M3u8 => Ok(encode_m3u(playlist, false)),
    }
}

fn encode_json(playlist: &Playlist) -> serde_json::Result<String> {
    let document = JsonPlaylist {
        attributes: attributes_value(playlist.attributes()),
        channels: playlist
            .entries()
            .iter()
            .map(|entry| JsonEntry {
                name: &entry.name,
                duration: entry.duration,
                url: &entry.url,
                attributes: attributes_value(&entry.attributes),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&document)
}

fn attributes_value(attributes: &Attributes) -> Value {
    let map: Map<String, Value> = attributes
        .iter()
        .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
        .collect();
    Value::Object(map)
}

fn encode_m3u(playlist: &Playlist, with_attributes: bool) -> String {
    let mut out = String::from("#EXTM3U");
    if with_attributes {
        push_attributes(&mut out, playlist.attributes());
    }
    out.push('\n');
    for entry in playlist.entries() {
        push_entry(&mut out, entry, with_attributes);
    }
    out
}

fn push_entry(out: &mut String, entry: &Entry, with_attributes: bool) {
    let _ = write!(out, "#EXTINF:{}", entry.duration);
    if with_attributes {
        push_attributes(out, &entry.attributes);
    }
    let _ = writeln!(out, ",{}", entry.name);
    let _ = writeln!(out, "{}", entry.url);
}

fn push_attributes(out: &mut String, attributes: &Attributes) {
    for (key, value) in attributes.iter() {
        let _ = write!(out, " {key}=\"{}\"", value.replace('"', "'"));
    }
}
