mod console;
mod format;
mod menu;
mod tui;

#[cfg(test)]
mod tests;

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::Cli;
use crate::collection::{Collection, HistoryStore, LocationSource};
use crate::paths::{data_dir, history_file_path};

use self::console::Console;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MenuChoice {
    LoadUrl,
    LoadMany,
    LoadHistory,
    Overview,
    Groups,
    TvgTags,
    Series,
    Search,
    Export,
    ExportGroups,
    Manage,
    Merge,
    Help,
    Quit,
}

impl MenuChoice {
    pub(crate) const ALL: [MenuChoice; 14] = [
        Self::LoadUrl,
        Self::LoadMany,
        Self::LoadHistory,
        Self::Overview,
        Self::Groups,
        Self::TvgTags,
        Self::Series,
        Self::Search,
        Self::Export,
        Self::ExportGroups,
        Self::Manage,
        Self::Merge,
        Self::Help,
        Self::Quit,
    ];

    pub(crate) fn key(self) -> &'static str {
        match self {
            Self::LoadUrl => "1",
            Self::LoadMany => "2",
            Self::LoadHistory => "3",
            Self::Overview => "4",
            Self::Groups => "5",
            Self::TvgTags => "6",
            Self::Series => "7",
            Self::Search => "8",
            Self::Export => "9",
            Self::ExportGroups => "10",
            Self::Manage => "11",
            Self::Merge => "12",
            Self::Help => "h",
            Self::Quit => "q",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::LoadUrl => "Load playlist",
            Self::LoadMany => "Load several playlists",
            Self::LoadHistory => "Load from history",
            Self::Overview => "Playlist overview",
            Self::Groups => "Group analysis",
            Self::TvgTags => "TVG tag analysis",
            Self::Series => "Series detection",
            Self::Search => "Search entries",
            Self::Export => "Export current playlist",
            Self::ExportGroups => "Export by group",
            Self::Manage => "Switch or remove playlists",
            Self::Merge => "Merge playlists",
            Self::Help => "Help",
            Self::Quit => "Quit",
        }
    }

    pub(crate) fn parse(input: &str) -> Option<Self> {
        let input = input.trim().to_ascii_lowercase();
        match input.as_str() {
            "quit" | "exit" => return Some(Self::Quit),
            "?" | "help" => return Some(Self::Help),
            _ => {}
        }
        Self::ALL.into_iter().find(|choice| choice.key() == input)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AppOptions {
    pub(crate) sanitize: bool,
    pub(crate) output_dir: PathBuf,
    pub(crate) use_tui: bool,
}

pub(crate) struct App<R, W> {
    collection: Collection,
    console: Console<R, W>,
    options: AppOptions,
}

pub fn run(cli: Cli) -> Result<()> {
    let data_dir = data_dir(cli.data_dir.as_deref())?;
    let (history, warning) = HistoryStore::open(&history_file_path(&data_dir));
    let output_dir = match cli.output_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to resolve current directory")?,
    };
    let options = AppOptions {
        sanitize: !cli.no_sanitize,
        output_dir,
        use_tui: !cli.no_tui && io::stdin().is_terminal() && io::stdout().is_terminal(),
    };

    let collection = Collection::new(history, Box::new(LocationSource::default()));
    let console = Console::new(io::stdin().lock(), io::stdout());
    let mut app = App::new(collection, console, options);
    if let Some(warning) = warning {
        app.console
            .line(format!("Warning: history not loaded: {warning}"))?;
    }
    if !cli.sources.is_empty() {
        app.load_locations(&cli.sources)?;
    }
    app.run_menu()
}

impl<R: BufRead, W: Write> App<R, W> {
    pub(crate) fn new(collection: Collection, console: Console<R, W>, options: AppOptions) -> Self {
        Self {
            collection,
            console,
            options,
        }
    }

    pub(crate) fn run_menu(&mut self) -> Result<()> {
        loop {
            self.print_menu()?;
            let Some(input) = self.console.prompt("Choose")? else {
                break;
            };
            if input.is_empty() {
                continue;
            }
            let Some(choice) = MenuChoice::parse(&input) else {
                self.console
                    .line(format!("Unknown option '{input}'. Enter h for help."))?;
                continue;
            };
            if choice == MenuChoice::Quit {
                break;
            }
            self.console.blank()?;
            self.dispatch(choice)?;
        }
        self.console.line("Bye.")?;
        Ok(())
    }

    fn dispatch(&mut self, choice: MenuChoice) -> Result<()> {
        match choice {
            MenuChoice::LoadUrl => self.load_single(),
            MenuChoice::LoadMany => self.load_several(),
            MenuChoice::LoadHistory => self.load_from_history(),
            MenuChoice::Overview => self.show_overview(),
            MenuChoice::Groups => self.show_groups(),
            MenuChoice::TvgTags => self.show_tvg_tags(),
            MenuChoice::Series => self.show_series(),
            MenuChoice::Search => self.search_entries(),
            MenuChoice::Export => self.export_current(),
            MenuChoice::ExportGroups => self.export_by_group(),
            MenuChoice::Manage => self.manage_playlists(),
            MenuChoice::Merge => self.merge_playlists(),
            MenuChoice::Help => self.show_help(),
            MenuChoice::Quit => Ok(()),
        }
    }

    fn print_menu(&mut self) -> Result<()> {
        self.console.blank()?;
        let status = match self.collection.current() {
            Some(handle) => format!(
                "Current: {} ({} entries), {} playlist(s) loaded",
                handle.name,
                handle.playlist.len(),
                self.collection.registry().len()
            ),
            None => "No playlist loaded".to_string(),
        };
        self.console.line(status)?;
        for choice in MenuChoice::ALL {
            self.console
                .line(format!("{:>3}. {}", choice.key(), choice.label()))?;
        }
        Ok(())
    }
}
