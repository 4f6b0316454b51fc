// to be called on startup and quit; saves studio settings so we can reload them later
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::pipeline::settings::StudioSettings;

pub const VOXTTY_DIR: &str = ".voxtty";
const SETTINGS_FILE: &str = "settings.json";
const LOG_FILE: &str = "voxtty.log";

// <project_dir>/.voxtty/settings.json
pub fn settings_file_path(project_dir: &Path) -> PathBuf {
    project_dir.join(VOXTTY_DIR).join(SETTINGS_FILE)
}

// <project_dir>/.voxtty/voxtty.log
pub fn log_file_path(project_dir: &Path) -> PathBuf {
    project_dir.join(VOXTTY_DIR).join(LOG_FILE)
}

// None when there's no file yet or it can't be parsed.
pub fn load_settings(project_dir: &Path) -> Option<StudioSettings> {
    let path = settings_file_path(project_dir);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(settings) => {
            debug!(path = %path.display(), "settings loaded");
            Some(settings)
        }
        Err(e) => {
            warn!(path = %path.display(), "ignoring unreadable settings: {e}");
            None
        }
    }
}

// Save the settings to disk, making the files if they don't exist already
pub fn save_settings(project_dir: &Path, settings: &StudioSettings) -> Result<()> {
    let path = settings_file_path(project_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?; // create .voxtty/ if needed
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, json)?;
    Ok(())
}
