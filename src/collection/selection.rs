//! Selection expressions over a numbered list of group labels.
//!
//! Grammar (keywords are case-insensitive):
//!
//! ```text
//! expr  := "all" | "none" | token ("," token)*
//! token := index | index "-" index
//! ```
//!
//! Indices are 1-based. Each resolved label is toggled; a label resolved an even
//! number of times in one expression is left as it was. Out-of-range indices are
//! ignored. Any malformed token rejects the whole expression and leaves the
//! selection untouched.

use std::collections::BTreeSet;

use super::error::{CollectionError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Selection {
    labels: BTreeSet<String>,
}

impl Selection {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    pub(crate) fn len(&self) -> usize {
        self.labels.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Applies `expression` against `candidates`, returning the new selection.
    pub(crate) fn apply(&self, candidates: &[String], expression: &str) -> Result<Selection> {
        let trimmed = expression.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self {
                labels: candidates.iter().cloned().collect(),
            });
        }
        if trimmed.eq_ignore_ascii_case("none") {
            return Ok(Self::new());
        }
        if trimmed.is_empty() {
            return Ok(self.clone());
        }

        let mut toggles: BTreeSet<usize> = BTreeSet::new();
        for token in trimmed.split(',') {
            let (start, end) = parse_token(token.trim())
                .map_err(|detail| CollectionError::parse(expression, detail))?;
            let last = end.min(candidates.len());
            for number in start.max(1)..=last {
                if !toggles.remove(&number) {
                    toggles.insert(number);
                }
            }
        }

        let mut labels = self.labels.clone();
        for number in toggles {
            let label = &candidates[number - 1];
            if !labels.remove(label) {
                labels.insert(label.clone());
            }
        }
        Ok(Self { labels })
    }
}

/// Returns an inclusive 1-based range. `usize::MAX` stands in for numbers too
/// large to represent; those are out of range for any candidate list.
fn parse_token(token: &str) -> std::result::Result<(usize, usize), String> {
    if token.is_empty() {
        return Err("empty item between commas".to_string());
    }
    match token.split_once('-') {
        None => {
            let number = parse_number(token)?;
            Ok((number, number))
        }
        Some((start_raw, end_raw)) => {
            let start = parse_number(start_raw.trim())
                .map_err(|_| format!("malformed range '{token}'"))?;
            let end = parse_number(end_raw.trim())
                .map_err(|_| format!("malformed range '{token}'"))?;
            if start > end {
                return Err(format!("range '{token}' runs backwards"));
            }
            Ok((start, end))
        }
    }
}

fn parse_number(raw: &str) -> std::result::Result<usize, String> {
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(format!("'{raw}' is not a number"));
    }
    Ok(raw.parse::<usize>().unwrap_or(usize::MAX))
}
