mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, DisplayConfig, SessionConfig};
pub use database::{CardRow, Database, DeckStats, ReviewLogRecord};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the directory holding the deck and the config file.
///
/// `CARDWISE_DATA_DIR` overrides the location. Otherwise it is
/// `~/.config/cardwise[-dev]/`, with the `-dev` suffix when
/// `CARDWISE_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("CARDWISE_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("CARDWISE_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("cardwise-dev")
            } else {
                base_dir.join("cardwise")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
