use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use directories::BaseDirs;
use tracing::Level;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".playlist-editor";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "playlist.db";
/// Log file written next to the database; stdout belongs to the TUI.
const LOG_FILE_NAME: &str = "playlist-editor.log";

/// Overrides the database location.
pub const DB_ENV: &str = "PLAYLIST_EDITOR_DB";
/// Overrides the log level (`error`, `warn`, `info`, `debug`, `trace`).
pub const LOG_ENV: &str = "PLAYLIST_EDITOR_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    pub log_level: Level,
}

impl Config {
    /// Resolve paths from the home directory, then apply environment
    /// overrides. `db_arg` (the first command-line argument) wins over both.
    pub fn from_env(db_arg: Option<String>) -> Result<Self> {
        let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        let data_dir = base_dirs.home_dir().join(DATA_DIR_NAME);
        Self::resolve(
            data_dir,
            db_arg.or_else(|| env::var(DB_ENV).ok()),
            env::var(LOG_ENV).ok(),
        )
    }

    fn resolve(
        data_dir: PathBuf,
        db_override: Option<String>,
        level_override: Option<String>,
    ) -> Result<Self> {
        let db_path = match db_override.filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => PathBuf::from(raw),
            None => data_dir.join(DB_FILE_NAME),
        };

        let log_level = match level_override {
            Some(raw) => Level::from_str(raw.trim())
                .map_err(|_| anyhow!("{LOG_ENV} must be one of error, warn, info, debug, trace"))?,
            None => Level::INFO,
        };

        Ok(Self {
            db_path,
            log_path: data_dir.join(LOG_FILE_NAME),
            log_level,
        })
    }
}
