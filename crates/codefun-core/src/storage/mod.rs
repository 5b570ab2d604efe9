mod config;
pub mod database;
pub mod history;
mod kv;

pub use config::{Config, QuizConfig};
pub use database::SqliteStore;
pub use history::{BestScores, HistoryEntry, HistoryLog, Theme, ThemePreference};
pub use kv::{KeyValueStore, MemoryStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/codefun[-dev]/` based on CODEFUN_ENV.
///
/// Set CODEFUN_ENV=dev to use the development data directory, or
/// CODEFUN_HOME to point at an explicit directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("CODEFUN_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("CODEFUN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("codefun-dev")
            } else {
                base_dir.join("codefun")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
