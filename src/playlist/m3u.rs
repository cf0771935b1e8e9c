use super::{Attributes, Entry, GROUP_ATTRIBUTE, Playlist};

const HEADER: &str = "#EXTM3U";
const EXTINF: &str = "#EXTINF:";
const EXTGRP: &str = "#EXTGRP:";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub(crate) struct ParseError {
    pub(crate) line: usize,
    pub(crate) message: String,
}

impl ParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

struct PendingInfo {
    line: usize,
    duration: i64,
    name: String,
    attributes: Attributes,
}

/// Decodes an (extended) M3U document.
pub(crate) fn parse_m3u(raw: &str) -> Result<Playlist, ParseError> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut lines = raw
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let Some((header_no, header)) = lines.next() else {
        return Err(ParseError::new(1, "empty document"));
    };
    let Some(header_rest) = header.strip_prefix(HEADER) else {
        return Err(ParseError::new(
            header_no,
            format!("expected {HEADER} header, found '{}'", preview(header)),
        ));
    };

    let mut playlist = Playlist::with_attributes(parse_attributes(header_rest));
    let mut pending: Option<PendingInfo> = None;
    let mut pending_group: Option<String> = None;

    for (line_no, line) in lines {
        if let Some(info) = line.strip_prefix(EXTINF) {
            if let Some(previous) = pending.as_ref() {
                return Err(ParseError::new(
                    previous.line,
                    "#EXTINF without a following URL",
                ));
            }
            pending = Some(parse_extinf(line_no, info)?);
            continue;
        }
        if let Some(group) = line.strip_prefix(EXTGRP) {
            pending_group = Some(group.trim().to_string());
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let mut entry = match pending.take() {
            Some(info) => Entry {
                name: info.name,
                url: line.to_string(),
                duration: info.duration,
                attributes: info.attributes,
            },
            None => Entry::new(line, line),
        };
        if let Some(group) = pending_group.take()
            && !group.is_empty()
            && entry.group(GROUP_ATTRIBUTE).is_none()
        {
            entry.attributes.set(GROUP_ATTRIBUTE, group);
        }
        playlist.push(entry);
    }

    if let Some(info) = pending {
        return Err(ParseError::new(info.line, "#EXTINF without a following URL"));
    }
    Ok(playlist)
}

fn parse_extinf(line_no: usize, info: &str) -> Result<PendingInfo, ParseError> {
    let (meta, name) = split_unquoted_comma(info);
    let meta = meta.trim();
    let duration_end = meta
        .find(|ch: char| ch.is_whitespace())
        .unwrap_or(meta.len());
    let (duration_raw, attrs_raw) = meta.split_at(duration_end);
    let duration = duration_raw
        .parse::<f64>()
        .map_err(|_| ParseError::new(line_no, format!("invalid duration '{duration_raw}'")))?;

    Ok(PendingInfo {
        line: line_no,
        duration: duration.trunc() as i64,
        name: name.unwrap_or_default().trim().to_string(),
        attributes: parse_attributes(attrs_raw),
    })
}

/// Splits at the first comma that is not inside double quotes.
fn split_unquoted_comma(raw: &str) -> (&str, Option<&str>) {
    let mut in_quotes = false;
    for (idx, ch) in raw.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => return (&raw[..idx], Some(&raw[idx + 1..])),
            _ => {}
        }
    }
    (raw, None)
}

/// Parses `key="value"` pairs; unquoted values run to the next whitespace.
fn parse_attributes(raw: &str) -> Attributes {
    let mut attributes = Attributes::new();
    let mut rest = raw.trim_start();
    while let Some(eq) = rest.find('=') {
        let key = rest[..eq].trim();
        let after = &rest[eq + 1..];
        let (value, remainder) = match after.strip_prefix('"') {
            Some(quoted) => match quoted.find('"') {
                Some(end) => (&quoted[..end], &quoted[end + 1..]),
                None => (quoted, ""),
            },
            None => {
                let end = after
                    .find(|ch: char| ch.is_whitespace())
                    .unwrap_or(after.len());
                (&after[..end], &after[end..])
            }
        };
        // A key may carry stray tokens before it ("tvg-id=.. junk key=..").
        let key = key.rsplit(char::is_whitespace).next().unwrap_or(key);
        if !key.is_empty() {
            attributes.set(key, value);
        }
        rest = remainder.trim_start();
    }
    attributes
}

fn preview(line: &str) -> String {
    line.chars().take(40).collect()
}
