pub mod config;
pub mod practice_db;

pub use config::Config;
pub use practice_db::{PracticeDb, ToggleOutcome};

use std::path::PathBuf;

/// Returns `~/.config/mindroom[-dev]/` based on MINDROOM_ENV.
///
/// Set MINDROOM_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MINDROOM_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("mindroom-dev")
    } else {
        base_dir.join("mindroom")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
