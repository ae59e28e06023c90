mod config;
pub mod ledger;
pub mod migrations;

pub use config::{Config, RewardsConfig, SentimentConfig, StreakConfig};
pub use ledger::{ActivityOutcome, CheckInOutcome, LedgerDb, LedgerSettings, DEFAULT_HISTORY_LIMIT};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Resolves the data directory and creates it if needed.
///
/// `MINDNEST_DATA_DIR` wins when set. Otherwise `~/.config/mindnest`, or
/// `~/.config/mindnest-dev` when `MINDNEST_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("MINDNEST_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("MINDNEST_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("mindnest-dev")
            } else {
                base_dir.join("mindnest")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDirUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
