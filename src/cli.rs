use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "iptvman",
    version,
    about = "Load IPTV playlists, inspect them and export group-filtered subsets"
)]
pub struct Cli {
    /// Playlist URLs or files to load before the menu opens
    #[arg(value_name = "SOURCE")]
    pub sources: Vec<String>,

    /// Keep playlists exactly as fetched
    #[arg(long)]
    pub no_sanitize: bool,

    /// Directory holding the URL history [default: platform data dir]
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory exports are written to [default: current directory]
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Use line prompts instead of the full-screen group selector
    #[arg(long)]
    pub no_tui: bool,

    /// Log debug details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
