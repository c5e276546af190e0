use anyhow::{Context, Result};
use std::path::PathBuf;

pub const DEFAULT_FILE_NAME: &str = ".pgdb.yaml";

/// Resolves the connections file path: an explicit override wins, otherwise a
/// dotfile in the home directory.
pub fn connections_path(override_path: Option<PathBuf>) -> Result<PathBuf> {
    match override_path {
        Some(path) => Ok(path),
        None => {
            let home = dirs::home_dir().context("Could not find home directory")?;
            Ok(home.join(DEFAULT_FILE_NAME))
        }
    }
}
