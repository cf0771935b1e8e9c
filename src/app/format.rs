use chrono::{Local, TimeZone};

use crate::collection::{ExportSession, HistoryEntry, PlaylistHandle};

pub(crate) fn truncate(s: &str, max: usize) -> String {
    let mut out = s.to_string();
    if out.chars().count() > max {
        out = out.chars().take(max.saturating_sub(3)).collect::<String>() + "...";
    }
    out
}

pub(crate) fn format_timestamp(timestamp: f64) -> String {
    let secs = timestamp.trunc() as i64;
    match Local.timestamp_opt(secs, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

pub(crate) fn percent(part: usize, whole: usize) -> String {
    if whole == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", part as f64 * 100.0 / whole as f64)
}

pub(crate) fn history_table(entries: &[HistoryEntry]) -> Vec<String> {
    let mut lines = vec![format!(
        "{:>3} {:<50} {:>8} {:<6} {:<16}",
        "#", "SOURCE", "ENTRIES", "STATUS", "WHEN"
    )];
    for (idx, entry) in entries.iter().enumerate() {
        lines.push(format!(
            "{:>3} {:<50} {:>8} {:<6} {:<16}",
            idx + 1,
            truncate(&entry.location, 50),
            entry.entry_count,
            if entry.success { "ok" } else { "failed" },
            format_timestamp(entry.timestamp)
        ));
    }
    lines
}

pub(crate) fn playlist_table(handles: &[PlaylistHandle], current: Option<&str>) -> Vec<String> {
    let mut lines = vec![format!("{:>3}   {:<40} {:>8}", "#", "NAME", "ENTRIES")];
    for (idx, handle) in handles.iter().enumerate() {
        let marker = if current == Some(handle.name.as_str()) { "*" } else { " " };
        lines.push(format!(
            "{:>3} {marker} {:<40} {:>8}",
            idx + 1,
            truncate(&handle.name, 40),
            handle.playlist.len()
        ));
    }
    lines
}

pub(crate) fn selection_table(session: &ExportSession) -> Vec<String> {
    let mut lines = vec![format!("{:>4} {:<3} {:<44} {:>8}", "#", "SEL", "GROUP", "ENTRIES")];
    for (idx, label) in session.candidates().iter().enumerate() {
        let mark = if session.selection().contains(label) { "[x]" } else { "[ ]" };
        lines.push(format!(
            "{:>4} {mark} {:<44} {:>8}",
            idx + 1,
            truncate(label, 44),
            session.index().count(label)
        ));
    }
    lines
}

pub(crate) fn selection_summary(session: &ExportSession) -> String {
    let mode = if session.exclude() { "EXCLUDE" } else { "INCLUDE" };
    format!(
        "{} of {} groups selected ({} entries), mode {mode}, {} entries would be exported",
        session.selection().len(),
        session.candidates().len(),
        session.selected_entry_count(),
        session.export_count()
    )
}

/// 1-based numbers and ranges in the order given, e.g. `3,1-2`. Duplicates are
/// kept once, at their first position.
pub(crate) fn parse_index_list(raw: &str, len: usize) -> Result<Vec<usize>, String> {
    let mut picked = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|token| !token.is_empty()) {
        let (start, end) = match token.split_once('-') {
            Some((start, end)) => (parse_position(start, len)?, parse_position(end, len)?),
            None => {
                let number = parse_position(token, len)?;
                (number, number)
            }
        };
        if start > end {
            return Err(format!("range '{token}' runs backwards"));
        }
        for number in start..=end {
            if !picked.contains(&number) {
                picked.push(number);
            }
        }
    }
    Ok(picked)
}

fn parse_position(raw: &str, len: usize) -> Result<usize, String> {
    let number: usize = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw.trim()))?;
    if number == 0 || number > len {
        return Err(format!("{number} is out of range (1-{len})"));
    }
    Ok(number)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ManageAction {
    Switch(usize),
    Remove(usize),
}

/// `s 2` / `s2` switches, `r 2` / `r2` removes.
pub(crate) fn parse_manage_action(raw: &str) -> Option<ManageAction> {
    let raw = raw.trim();
    let mut chars = raw.chars();
    let verb = chars.next()?.to_ascii_lowercase();
    let number: usize = chars.as_str().trim().parse().ok()?;
    if number == 0 {
        return None;
    }
    match verb {
        's' => Some(ManageAction::Switch(number)),
        'r' => Some(ManageAction::Remove(number)),
        _ => None,
    }
}
