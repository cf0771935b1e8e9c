use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub fn data_dir(overridden: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = overridden {
        return Ok(dir.to_path_buf());
    }
    let base = dirs::data_dir().context("unable to resolve data directory")?;
    Ok(base.join("iptvman"))
}

pub fn history_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join("url_history.json")
}
