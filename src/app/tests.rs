use std::fs;
use std::io::Cursor;
use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::collection::{Collection, ExportSession, HistoryStore, LocationSource};
use crate::playlist::{Entry, GROUP_ATTRIBUTE, Playlist};

use super::console::Console;
use super::format::*;
use super::tui::{KeyOutcome, SelectorState, handle_key};
use super::{App, AppOptions, MenuChoice};

const SAMPLE: &str = "#EXTM3U\n\
#EXTINF:-1 group-title=\"News\",BBC\nhttp://s/bbc\n\
#EXTINF:-1 group-title=\"Sports\",ESPN\nhttp://s/espn\n\
#EXTINF:-1 group-title=\"Sports\",Sky\nhttp://s/sky\n\
#EXTINF:-1,Loose\nhttp://s/loose\n";

type ScriptedApp = App<Cursor<Vec<u8>>, Vec<u8>>;

fn scripted_app(script: &str, output_dir: &Path) -> ScriptedApp {
    let collection = Collection::new(
        HistoryStore::in_memory(),
        Box::new(LocationSource::default()),
    );
    let console = Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new());
    App::new(
        collection,
        console,
        AppOptions {
            sanitize: true,
            output_dir: output_dir.to_path_buf(),
            use_tui: false,
        },
    )
}

fn output_of(app: &ScriptedApp) -> String {
    String::from_utf8(app.console.output.clone()).expect("console output is UTF-8")
}

fn write_sample(dir: &Path, name: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, SAMPLE).expect("write sample playlist");
    path.to_str().expect("utf-8 path").to_string()
}

fn exported_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read output dir")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("playlist_"))
        .collect();
    names.sort();
    names
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_text(session: &mut ExportSession, state: &mut SelectorState, text: &str) {
    for ch in text.chars() {
        handle_key(session, state, key(KeyCode::Char(ch)));
    }
}

fn selector_session() -> ExportSession {
    let playlist: Playlist = ["News", "Sports", "Music", "Sports"]
        .iter()
        .enumerate()
        .map(|(i, group)| {
            Entry::new(format!("ch{i}"), format!("http://s/{i}"))
                .with_attribute(GROUP_ATTRIBUTE, group)
        })
        .collect();
    ExportSession::start(&playlist, GROUP_ATTRIBUTE)
}

#[test]
fn menu_choice_parses_keys_and_aliases() {
    assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::LoadUrl));
    assert_eq!(MenuChoice::parse(" 10 "), Some(MenuChoice::ExportGroups));
    assert_eq!(MenuChoice::parse("Q"), Some(MenuChoice::Quit));
    assert_eq!(MenuChoice::parse("exit"), Some(MenuChoice::Quit));
    assert_eq!(MenuChoice::parse("?"), Some(MenuChoice::Help));
    assert_eq!(MenuChoice::parse("13"), None);
    assert_eq!(MenuChoice::parse("load"), None);
}

#[test]
fn menu_keys_are_unique() {
    for (idx, choice) in MenuChoice::ALL.iter().enumerate() {
        for other in &MenuChoice::ALL[idx + 1..] {
            assert_ne!(choice.key(), other.key());
        }
    }
}

#[test]
fn parse_index_list_keeps_order_and_drops_repeats() {
    assert_eq!(parse_index_list("3,1", 3), Ok(vec![3, 1]));
    assert_eq!(parse_index_list("2-3, 1, 2", 3), Ok(vec![2, 3, 1]));
    assert_eq!(parse_index_list("", 3), Ok(vec![]));
}

#[test]
fn parse_index_list_rejects_bad_input() {
    assert!(parse_index_list("0", 3).is_err());
    assert!(parse_index_list("4", 3).is_err());
    assert!(parse_index_list("a", 3).is_err());
    assert!(parse_index_list("3-1", 3).is_err());
}

#[test]
fn parse_manage_action_accepts_compact_and_spaced_forms() {
    assert_eq!(parse_manage_action("s2"), Some(ManageAction::Switch(2)));
    assert_eq!(parse_manage_action("R 1"), Some(ManageAction::Remove(1)));
    assert_eq!(parse_manage_action("s0"), None);
    assert_eq!(parse_manage_action("x1"), None);
    assert_eq!(parse_manage_action("s"), None);
}

#[test]
fn truncate_adds_ellipsis_only_when_needed() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a much longer title", 10), "a much ...");
}

#[test]
fn percent_handles_empty_whole() {
    assert_eq!(percent(1, 4), "25.0%");
    assert_eq!(percent(3, 0), "0.0%");
}

#[test]
fn selector_applies_typed_expression_on_enter() {
    let mut session = selector_session();
    let mut state = SelectorState::new(session.candidates().len());
    // candidates: Music, News, Sports
    type_text(&mut session, &mut state, "1,3");
    assert_eq!(state.input, "1,3");
    assert_eq!(
        handle_key(&mut session, &mut state, key(KeyCode::Enter)),
        KeyOutcome::Continue
    );
    assert!(state.input.is_empty());
    assert!(session.selection().contains("Music"));
    assert!(session.selection().contains("Sports"));
    assert_eq!(session.export_count(), 3);
    assert!(state.status.starts_with("INFO:"));
}

#[test]
fn selector_keeps_input_and_selection_on_bad_expression() {
    let mut session = selector_session();
    let mut state = SelectorState::new(session.candidates().len());
    type_text(&mut session, &mut state, "2");
    handle_key(&mut session, &mut state, key(KeyCode::Enter));

    type_text(&mut session, &mut state, "1,x");
    handle_key(&mut session, &mut state, key(KeyCode::Enter));
    assert_eq!(state.input, "1,x");
    assert!(state.status.starts_with("ERROR:"));
    assert_eq!(session.selection().len(), 1);
    assert!(session.selection().contains("News"));
}

#[test]
fn selector_space_toggles_highlighted_row() {
    let mut session = selector_session();
    let mut state = SelectorState::new(session.candidates().len());
    handle_key(&mut session, &mut state, key(KeyCode::Down));
    handle_key(&mut session, &mut state, key(KeyCode::Char(' ')));
    assert!(session.selection().contains("News"));
    handle_key(&mut session, &mut state, key(KeyCode::Enter));
    assert!(session.selection().is_empty());

    handle_key(&mut session, &mut state, key(KeyCode::End));
    assert_eq!(state.table_state.selected(), Some(2));
    handle_key(&mut session, &mut state, key(KeyCode::PageUp));
    assert_eq!(state.table_state.selected(), Some(0));
}

#[test]
fn selector_commit_requires_something_to_export() {
    let mut session = selector_session();
    let mut state = SelectorState::new(session.candidates().len());
    assert_eq!(
        handle_key(&mut session, &mut state, key(KeyCode::F(2))),
        KeyOutcome::Continue
    );
    assert!(state.status.starts_with("ERROR:"));

    handle_key(&mut session, &mut state, key(KeyCode::Tab));
    assert!(session.exclude());
    assert_eq!(
        handle_key(
            &mut session,
            &mut state,
            KeyEvent::new(KeyCode::Char('e'), KeyModifiers::CONTROL)
        ),
        KeyOutcome::Commit
    );
}

#[test]
fn selector_escape_cancels() {
    let mut session = selector_session();
    let mut state = SelectorState::new(session.candidates().len());
    assert_eq!(
        handle_key(&mut session, &mut state, key(KeyCode::Esc)),
        KeyOutcome::Cancel
    );
}

#[test]
fn menu_loads_file_and_exports_selected_group() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_sample(dir.path(), "sample.m3u");
    let out = dir.path().join("out");
    let script = format!("1\n{path}\nmine\n\n10\n2\ne\nm3u8\nq\n");

    let mut app = scripted_app(&script, &out);
    app.run_menu().expect("menu runs");

    let output = output_of(&app);
    assert!(output.contains("Loaded 4 entries"), "output: {output}");
    assert_eq!(
        app.collection.current().map(|h| h.name.as_str()),
        Some("mine")
    );

    let files = exported_files(&out);
    assert_eq!(files.len(), 1, "files: {files:?}");
    assert!(files[0].starts_with("playlist_Sports_selected_"));
    assert!(files[0].ends_with(".m3u8"));
    let text = fs::read_to_string(out.join(&files[0])).expect("read export");
    assert_eq!(
        text,
        "#EXTM3U\n#EXTINF:-1,ESPN\nhttp://s/espn\n#EXTINF:-1,Sky\nhttp://s/sky\n"
    );
}

#[test]
fn menu_exclude_export_keeps_ungrouped_entries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_sample(dir.path(), "sample.m3u");
    let script = format!("1\n{path}\n\n\n10\n1\nx\ne\njson\nq\n");

    let mut app = scripted_app(&script, dir.path());
    app.run_menu().expect("menu runs");

    let files = exported_files(dir.path());
    assert_eq!(files.len(), 1, "files: {files:?}");
    assert!(files[0].contains("_News_excluded_"));
    let text = fs::read_to_string(dir.path().join(&files[0])).expect("read export");
    let value: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");
    let names: Vec<&str> = value["channels"]
        .as_array()
        .expect("channels array")
        .iter()
        .filter_map(|channel| channel["name"].as_str())
        .collect();
    assert_eq!(names, vec!["ESPN", "Sky", "Loose"]);
}

#[test]
fn menu_reports_bad_selection_and_cancel() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_sample(dir.path(), "sample.m3u");
    let script = format!("1\n{path}\n\n\n10\n1-x\ne\nc\nq\n");

    let mut app = scripted_app(&script, dir.path());
    app.run_menu().expect("menu runs");

    let output = output_of(&app);
    assert!(output.contains("Error: invalid selection '1-x'"), "output: {output}");
    assert!(output.contains("No groups selected."));
    assert!(output.contains("Export cancelled."));
    assert!(exported_files(dir.path()).is_empty());
}

#[test]
fn menu_failed_load_is_reported_and_recorded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("missing.m3u");
    let script = format!("1\n{}\n\n\n4\nq\n", missing.display());

    let mut app = scripted_app(&script, dir.path());
    app.run_menu().expect("menu runs");

    let output = output_of(&app);
    assert!(output.contains("Load failed:"), "output: {output}");
    assert!(output.contains("No current playlist."));
    let recorded = app.collection.history().get(1).expect("history entry");
    assert!(!recorded.success);
}

#[test]
fn menu_merges_and_removes_playlists() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first = write_sample(dir.path(), "a.m3u");
    let second = write_sample(dir.path(), "b.m3u");
    let script = format!("1\n{first}\na\n\n1\n{second}\nb\n\n12\n2,1\nboth\n11\nr1\ny\nq\n");

    let mut app = scripted_app(&script, dir.path());
    app.run_menu().expect("menu runs");

    let registry = app.collection.registry();
    let names: Vec<&str> = registry.list().iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, vec!["b", "both"]);
    assert_eq!(registry.current_name(), Some("both"));
    assert_eq!(registry.get("both").map(Playlist::len), Some(8));
}

#[test]
fn menu_reloads_from_history() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_sample(dir.path(), "sample.m3u");
    let script = format!("1\n{path}\nfirst\n\n3\n1\nq\n");

    let mut app = scripted_app(&script, dir.path());
    app.run_menu().expect("menu runs");

    assert_eq!(app.collection.registry().len(), 2);
    assert_eq!(app.collection.history().len(), 1);
    assert!(output_of(&app).contains("Recent sources (1 of 1 kept"));
}

#[test]
fn menu_stops_at_end_of_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut app = scripted_app("bogus\n", dir.path());
    app.run_menu().expect("menu runs");
    let output = output_of(&app);
    assert!(output.contains("Unknown option 'bogus'"));
    assert!(output.trim_end().ends_with("Bye."));
}
