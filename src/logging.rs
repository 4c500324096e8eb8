use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use color_eyre::eyre::{Result, eyre};
use tracing::Level;

const APP_DIR: &str = "hotel-tui";
const LOG_FILE: &str = "hotel-tui.log";

/// Default log location: <data-local-dir>/hotel-tui/hotel-tui.log
pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join(APP_DIR).join(LOG_FILE))
}

/// Send `tracing` output to a file. The terminal belongs to the UI.
pub fn init(path: Option<&Path>, level: Level) -> Result<PathBuf> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_log_path().ok_or_else(|| eyre!("could not determine data directory"))?,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_path_ends_with_app_file() {
        if let Some(path) = default_log_path() {
            assert!(path.ends_with("hotel-tui/hotel-tui.log"));
        }
    }
}
