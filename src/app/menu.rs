use std::io::{BufRead, Write};

use anyhow::Result;
use chrono::Local;

use crate::collection::{
    ExportSession, GroupIndex, HISTORY_CAP, LoadOutcome, export_file_name, write_export,
};
use crate::playlist::{
    ExportFormat, GROUP_ATTRIBUTE, Playlist, SearchFields, detect_series, overview, search,
    top_groups, tvg_tag_counts, tvg_tag_description,
};

use super::format::{
    ManageAction, history_table, parse_index_list, parse_manage_action, percent, playlist_table,
    selection_summary, selection_table, truncate,
};
use super::{App, tui};

const NO_CURRENT: &str = "No current playlist. Load one first.";
const HISTORY_SHOWN: usize = 20;
const RESULTS_SHOWN: usize = 20;

impl<R: BufRead, W: Write> App<R, W> {
    pub(super) fn load_single(&mut self) -> Result<()> {
        let Some(location) = self.console.prompt("Playlist URL or file path")? else {
            return Ok(());
        };
        if location.is_empty() {
            self.console.line("No location given.")?;
            return Ok(());
        }
        let Some(name) = self.console.prompt("Name (Enter for automatic)")? else {
            return Ok(());
        };
        let Some(sanitize) = self
            .console
            .confirm("Sanitize entries", self.options.sanitize)?
        else {
            return Ok(());
        };

        self.console.line(format!("Loading {location} ..."))?;
        let name = (!name.is_empty()).then_some(name.as_str());
        let outcome = self.collection.load(&location, sanitize, name);
        self.report_load(&location, outcome)
    }

    pub(super) fn load_several(&mut self) -> Result<()> {
        self.console
            .line("Enter one URL or path per line, empty line to start loading.")?;
        let mut locations = Vec::new();
        while let Some(line) = self.console.prompt(&format!("#{}", locations.len() + 1))? {
            if line.is_empty() {
                break;
            }
            locations.push(line);
        }
        if locations.is_empty() {
            self.console.line("Nothing to load.")?;
            return Ok(());
        }
        self.load_locations(&locations)
    }

    pub(super) fn load_locations(&mut self, locations: &[String]) -> Result<()> {
        let results = self.collection.load_many(locations, self.options.sanitize);
        let loaded = results.iter().filter(|(_, outcome)| outcome.is_ok()).count();
        for (location, outcome) in results {
            self.report_load(&location, outcome)?;
        }
        self.console.line(format!(
            "Loaded {loaded} of {} playlist(s).",
            locations.len()
        ))?;
        Ok(())
    }

    fn report_load(
        &mut self,
        location: &str,
        outcome: crate::collection::Result<LoadOutcome>,
    ) -> Result<()> {
        match outcome {
            Ok(outcome) => {
                self.console.line(format!(
                    "Loaded {} entries from {} as '{}'.",
                    outcome.entry_count,
                    truncate(location, 60),
                    outcome.name
                ))?;
                if let Some(warning) = outcome.warning {
                    self.console
                        .line(format!("Warning: history not saved: {warning}"))?;
                }
            }
            Err(err) if err.is_load_failure() => {
                self.console.line(format!("Load failed: {err}"))?;
            }
            Err(err) => self.console.line(format!("Error: {err}"))?,
        }
        Ok(())
    }

    pub(super) fn load_from_history(&mut self) -> Result<()> {
        let history = self.collection.history();
        if history.is_empty() {
            self.console.line("History is empty.")?;
            return Ok(());
        }
        let shown = history.list(HISTORY_SHOWN);
        self.console.line(format!(
            "Recent sources ({} of {} kept, at most {HISTORY_CAP}):",
            shown.len(),
            history.len()
        ))?;
        for line in history_table(shown) {
            self.console.line(line)?;
        }

        let Some(answer) = self.console.prompt("Entry number (Enter to cancel)")? else {
            return Ok(());
        };
        if answer.is_empty() {
            return Ok(());
        }
        let Ok(number) = answer.parse::<usize>() else {
            self.console.line(format!("'{answer}' is not a number."))?;
            return Ok(());
        };
        let Some(location) = self
            .collection
            .history()
            .get(number)
            .map(|entry| entry.location.clone())
        else {
            self.console.line(format!("No history entry #{number}."))?;
            return Ok(());
        };
        self.console.line(format!("Loading {location} ..."))?;
        let outcome = self
            .collection
            .load_from_history(number, self.options.sanitize);
        self.report_load(&location, outcome)
    }

    pub(super) fn show_overview(&mut self) -> Result<()> {
        let Some(handle) = self.collection.current() else {
            self.console.line(NO_CURRENT)?;
            return Ok(());
        };
        let stats = overview(&handle.playlist);
        let console = &mut self.console;
        console.line(format!("Playlist: {}", handle.name))?;
        console.line(format!("  Entries:      {}", stats.entries))?;
        console.line(format!("  Groups:       {}", stats.groups))?;
        console.line(format!("  Unique URLs:  {}", stats.unique_urls))?;
        console.line(format!("  Series:       {}", stats.series))?;
        console.line(format!("  Attributes:   {}", stats.playlist_attributes))?;
        for (key, value) in handle.playlist.attributes().iter() {
            console.line(format!("    {key} = {}", truncate(value, 60)))?;
        }

        let top = top_groups(&handle.playlist, 10);
        if !top.is_empty() {
            console.line("Top groups:")?;
            for (label, count) in top {
                console.line(format!("  {:<40} {count:>6}", truncate(&label, 40)))?;
            }
        }
        Ok(())
    }

    pub(super) fn show_groups(&mut self) -> Result<()> {
        let Some(handle) = self.collection.current() else {
            self.console.line(NO_CURRENT)?;
            return Ok(());
        };
        let index = GroupIndex::build(&handle.playlist, GROUP_ATTRIBUTE);
        let mut buckets: Vec<(String, usize)> = index
            .buckets()
            .map(|(key, positions)| (key.to_string(), positions.len()))
            .collect();
        buckets.sort_by(|left, right| right.1.cmp(&left.1));

        self.console.line(format!(
            "{} groups over {} entries:",
            buckets.len(),
            index.entry_count()
        ))?;
        self.console
            .line(format!("{:<44} {:>8} {:>7}", "GROUP", "ENTRIES", "SHARE"))?;
        for (label, count) in buckets {
            self.console.line(format!(
                "{:<44} {count:>8} {:>7}",
                truncate(&label, 44),
                percent(count, index.entry_count())
            ))?;
        }
        Ok(())
    }

    pub(super) fn show_tvg_tags(&mut self) -> Result<()> {
        let Some(handle) = self.collection.current() else {
            self.console.line(NO_CURRENT)?;
            return Ok(());
        };
        let total = handle.playlist.len();
        let tags = tvg_tag_counts(&handle.playlist);
        if tags.is_empty() {
            self.console.line("No tvg-* attributes found.")?;
            return Ok(());
        }
        self.console.line(format!(
            "{:<16} {:>8} {:>7}  {}",
            "TAG", "ENTRIES", "SHARE", "MEANING"
        ))?;
        for (tag, count) in tags {
            self.console.line(format!(
                "{:<16} {count:>8} {:>7}  {}",
                truncate(&tag, 16),
                percent(count, total),
                tvg_tag_description(&tag)
            ))?;
        }
        Ok(())
    }

    pub(super) fn show_series(&mut self) -> Result<()> {
        if self.collection.current().is_none() {
            self.console.line(NO_CURRENT)?;
            return Ok(());
        }
        let Some(skip_singles) = self.console.confirm("Ignore shows with one episode", true)?
        else {
            return Ok(());
        };
        let Some(handle) = self.collection.current() else {
            return Ok(());
        };
        let split = detect_series(&handle.playlist, skip_singles);
        if split.series.is_empty() {
            self.console.line("No series detected.")?;
            return Ok(());
        }
        let mut shows: Vec<(&String, usize)> = split
            .series
            .iter()
            .map(|(show, episodes)| (show, episodes.len()))
            .collect();
        shows.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(right.0)));

        self.console.line(format!(
            "{} series, {} other entries:",
            shows.len(),
            split.remainder.len()
        ))?;
        for (show, episodes) in shows.iter().take(RESULTS_SHOWN) {
            self.console
                .line(format!("  {:<50} {episodes:>5} ep", truncate(show, 50)))?;
        }
        if shows.len() > RESULTS_SHOWN {
            self.console
                .line(format!("  ... and {} more", shows.len() - RESULTS_SHOWN))?;
        }
        Ok(())
    }

    pub(super) fn search_entries(&mut self) -> Result<()> {
        if self.collection.current().is_none() {
            self.console.line(NO_CURRENT)?;
            return Ok(());
        }
        let Some(pattern) = self.console.prompt("Search pattern (regex)")? else {
            return Ok(());
        };
        if pattern.is_empty() {
            return Ok(());
        }
        let Some(scope) = self
            .console
            .prompt("Search in [b]oth, [n]ame or [g]roup (default both)")?
        else {
            return Ok(());
        };
        let fields = match scope.to_ascii_lowercase().as_str() {
            "n" | "name" => SearchFields {
                name: true,
                group: false,
            },
            "g" | "group" => SearchFields {
                name: false,
                group: true,
            },
            _ => SearchFields::default(),
        };
        let Some(case_sensitive) = self.console.confirm("Case sensitive", false)? else {
            return Ok(());
        };

        let Some(handle) = self.collection.current() else {
            return Ok(());
        };
        let found = match search(&handle.playlist, &pattern, fields, case_sensitive) {
            Ok(found) => found,
            Err(err) => {
                self.console.line(format!("Error: invalid pattern: {err}"))?;
                return Ok(());
            }
        };
        self.console
            .line(format!("{} matching entries.", found.len()))?;
        for entry in found.entries().iter().take(RESULTS_SHOWN) {
            self.console.line(format!(
                "  {:<40} {:<24} {}",
                truncate(&entry.name, 40),
                truncate(entry.group(GROUP_ATTRIBUTE).unwrap_or("-"), 24),
                truncate(&entry.url, 50)
            ))?;
        }
        if found.is_empty() {
            return Ok(());
        }
        if self.console.confirm("Export the matches", false)? == Some(true) {
            self.export_playlist(&found, None)?;
        }
        Ok(())
    }

    pub(super) fn export_current(&mut self) -> Result<()> {
        let Some(playlist) = self.collection.current_playlist().cloned() else {
            self.console.line(NO_CURRENT)?;
            return Ok(());
        };
        self.export_playlist(&playlist, None)
    }

    pub(super) fn export_by_group(&mut self) -> Result<()> {
        let Some(mut session) = self.collection.start_export() else {
            self.console.line(NO_CURRENT)?;
            return Ok(());
        };
        if session.candidates().is_empty() {
            self.console
                .line("The current playlist has no grouped entries.")?;
            return Ok(());
        }

        let committed = if self.options.use_tui {
            tui::select_groups(&mut session)?
        } else {
            self.select_groups_by_line(&mut session)?
        };
        if !committed {
            self.console.line("Export cancelled.")?;
            return Ok(());
        }
        self.console.line(selection_summary(&session))?;
        let filtered = session.finish();
        self.export_playlist(&filtered.playlist, Some(&session))
    }

    fn select_groups_by_line(&mut self, session: &mut ExportSession) -> Result<bool> {
        loop {
            for line in selection_table(session) {
                self.console.line(line)?;
            }
            self.console.line(selection_summary(session))?;
            let Some(input) = self.console.prompt(
                "Toggle groups (1,3-5 | all | none), x flips include/exclude, e exports, c cancels",
            )?
            else {
                return Ok(false);
            };
            match input.to_ascii_lowercase().as_str() {
                "c" | "cancel" => return Ok(false),
                "x" => session.set_exclude(!session.exclude()),
                "e" | "export" => {
                    if session.selection().is_empty() && !session.exclude() {
                        self.console.line("No groups selected.")?;
                        continue;
                    }
                    return Ok(true);
                }
                _ => {
                    if let Err(err) = session.apply(&input) {
                        self.console.line(format!("Error: {err}"))?;
                    }
                }
            }
        }
    }

    fn ask_format(&mut self) -> Result<Option<ExportFormat>> {
        let choices = ExportFormat::ALL
            .iter()
            .map(ExportFormat::to_string)
            .collect::<Vec<_>>()
            .join("/");
        loop {
            let Some(answer) = self
                .console
                .prompt(&format!("Format [{choices}] (default json)"))?
            else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(Some(ExportFormat::Json));
            }
            match answer.parse::<ExportFormat>() {
                Ok(format) => return Ok(Some(format)),
                Err(err) => self.console.line(format!("Error: {err}"))?,
            }
        }
    }

    fn export_playlist(
        &mut self,
        playlist: &Playlist,
        session: Option<&ExportSession>,
    ) -> Result<()> {
        let Some(format) = self.ask_format()? else {
            return Ok(());
        };
        let timestamp = Local::now().timestamp();
        let file_name = match session {
            Some(session) => session.file_name(format, timestamp),
            None => export_file_name(None, format, timestamp),
        };
        match write_export(playlist, format, &self.options.output_dir, &file_name) {
            Ok(report) => self.console.line(format!(
                "Exported {} entries to {}",
                report.count,
                report.path.display()
            ))?,
            Err(err) => self.console.line(format!("Error: {err:#}"))?,
        }
        Ok(())
    }

    pub(super) fn manage_playlists(&mut self) -> Result<()> {
        let registry = self.collection.registry();
        if registry.is_empty() {
            self.console.line("No playlists loaded.")?;
            return Ok(());
        }
        let names: Vec<String> = registry
            .list()
            .iter()
            .map(|handle| handle.name.clone())
            .collect();
        for line in playlist_table(registry.list(), registry.current_name()) {
            self.console.line(line)?;
        }

        let Some(answer) = self
            .console
            .prompt("s<N> switch, r<N> remove, Enter to go back")?
        else {
            return Ok(());
        };
        if answer.is_empty() {
            return Ok(());
        }
        let Some(action) = parse_manage_action(&answer) else {
            self.console.line(format!("Unknown action '{answer}'."))?;
            return Ok(());
        };
        let number = match action {
            ManageAction::Switch(number) | ManageAction::Remove(number) => number,
        };
        let Some(name) = names.get(number - 1) else {
            self.console
                .line(format!("No playlist #{number} (1-{}).", names.len()))?;
            return Ok(());
        };

        match action {
            ManageAction::Switch(_) => match self.collection.switch(name) {
                Ok(()) => self.console.line(format!("Current playlist is now '{name}'."))?,
                Err(err) => self.console.line(format!("Error: {err}"))?,
            },
            ManageAction::Remove(_) => {
                if self.console.confirm(&format!("Remove '{name}'"), false)? != Some(true) {
                    return Ok(());
                }
                match self.collection.remove(name) {
                    Ok(removed) => self.console.line(format!(
                        "Removed '{}' ({} entries).",
                        removed.name,
                        removed.playlist.len()
                    ))?,
                    Err(err) => self.console.line(format!("Error: {err}"))?,
                }
            }
        }
        Ok(())
    }

    pub(super) fn merge_playlists(&mut self) -> Result<()> {
        let registry = self.collection.registry();
        if registry.len() < 2 {
            self.console
                .line("Load at least two playlists to merge.")?;
            return Ok(());
        }
        let names: Vec<String> = registry
            .list()
            .iter()
            .map(|handle| handle.name.clone())
            .collect();
        for line in playlist_table(registry.list(), registry.current_name()) {
            self.console.line(line)?;
        }

        let Some(answer) = self
            .console
            .prompt("Playlists to merge, in order (e.g. 1,3 or 1-3)")?
        else {
            return Ok(());
        };
        let picked = match parse_index_list(&answer, names.len()) {
            Ok(picked) if picked.len() >= 2 => picked,
            Ok(_) => {
                self.console.line("Pick at least two playlists.")?;
                return Ok(());
            }
            Err(err) => {
                self.console.line(format!("Error: {err}"))?;
                return Ok(());
            }
        };
        let Some(merged_name) = self.console.prompt("Merged name (Enter for automatic)")? else {
            return Ok(());
        };

        let selected: Vec<String> = picked
            .into_iter()
            .map(|number| names[number - 1].clone())
            .collect();
        let merged_name = (!merged_name.is_empty()).then_some(merged_name.as_str());
        let report = self.collection.merge(&selected, merged_name);
        self.console.line(format!(
            "Merged {} playlist(s) into '{}' ({} entries).",
            report.merged.len(),
            report.name,
            report.entry_count
        ))?;
        if !report.skipped.is_empty() {
            self.console
                .line(format!("Skipped: {}", report.skipped.join(", ")))?;
        }
        Ok(())
    }

    pub(super) fn show_help(&mut self) -> Result<()> {
        let help = [
            "Sources may be http(s) URLs, file:// URLs or local paths.",
            "Every load attempt is remembered in the history (most recent first).",
            "",
            "Group selection:",
            "  Groups are numbered in sorted order. Numbers and ranges toggle:",
            "  '1,3-5' flips groups 1, 3, 4 and 5. A group named twice in one",
            "  expression ends up unchanged. 'all' selects every group, 'none'",
            "  clears the selection. Out-of-range numbers are ignored; anything",
            "  malformed is rejected and the selection stays as it was.",
            "  In exclude mode everything except the selected groups is exported,",
            "  including entries without a group.",
            "",
            "Export formats: json, m3u (with attributes), m3u8 (names and URLs).",
        ];
        for line in help {
            self.console.line(line)?;
        }
        Ok(())
    }
}
