//! # Configuration Module
//!
//! Data directory and runtime settings for the listening history.
//!
//! ## Data Storage
//!
//! The history database lives in the platform-standard data directory:
//! - Linux: `~/.local/share/listenlog/history.db`
//! - macOS: `~/Library/Application Support/listenlog/history.db`
//! - Windows: `%APPDATA%\listenlog\history.db`

use anyhow::{Result, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the application subdirectory inside the system data directory.
pub const APP_DIR_NAME: &str = "listenlog";

/// Fixed file name of the history database.
pub const DB_FILE_NAME: &str = "history.db";

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Returns the platform-appropriate data directory, creating it if needed.
///
/// # Errors
///
/// This function will return an error if:
/// - The system data directory cannot be determined
/// - The `listenlog` subdirectory cannot be created due to permissions
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| anyhow::anyhow!(
            "Could not determine system data directory. Please ensure your platform supports standard data directories."
        ))?;

    let app_dir = data_dir.join(APP_DIR_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!(
            "Failed to create data directory at {}. Please check file permissions.",
            app_dir.display()
        ))?;

    Ok(app_dir)
}

/// Returns the path of the history database file.
///
/// ```no_run
/// let db_path = listenlog::config::get_db_path()?;
/// println!("Database location: {}", db_path.display());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn get_db_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(DB_FILE_NAME))
}

/// Default location of the JSON settings file.
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(CONFIG_FILE_NAME))
}

/// Configuration for runtime behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Path to the database file
    pub db_path: PathBuf,
    /// When false, now-playing updates are not recorded.
    pub history_enabled: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            db_path: get_db_path().unwrap_or_else(|_| PathBuf::from(DB_FILE_NAME)),
            history_enabled: true,
        }
    }
}

impl RuntimeConfig {
    /// Create a new runtime configuration
    pub fn new() -> Result<Self> {
        Ok(Self {
            db_path: get_db_path()?,
            history_enabled: true,
        })
    }

    /// Create configuration with explicit database path
    pub fn with_db_path(db_path: PathBuf) -> Self {
        Self {
            db_path,
            history_enabled: true,
        }
    }

    /// Read settings from a JSON file. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Malformed config file {}", path.display()))
    }

    /// Settings for a run given the optional `--config` and `--db` paths.
    ///
    /// The default settings file is only looked up when `config_path` is
    /// absent, and failing to locate it is fine as long as `db` is given.
    pub fn resolve(config_path: Option<&Path>, db: Option<&Path>) -> Result<Self> {
        Self::resolve_with(config_path, db, get_config_path)
    }

    fn resolve_with(
        config_path: Option<&Path>,
        db: Option<&Path>,
        default_config_path: impl FnOnce() -> Result<PathBuf>,
    ) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::load(path)?,
            None => match default_config_path() {
                Ok(path) => Self::load(&path)?,
                Err(e) if db.is_some() => {
                    log::debug!("No default settings file: {e:#}");
                    Self::with_db_path(PathBuf::new())
                }
                Err(e) => return Err(e),
            },
        };

        if let Some(db) = db {
            config.db_path = db.to_path_buf();
        }
        log::debug!("Using history database {}", config.db_path.display());
        Ok(config)
    }
}
