mod config;
mod store;

pub use config::{Config, TimerConfig};
pub use store::{ConfigStore, FileConfigStore, MemoryConfigStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// Resolution order:
/// - `TICKDOWN_DATA_DIR`, if set
/// - `~/.config/tickdown-dev/` when `TICKDOWN_ENV=dev`
/// - `~/.config/tickdown/`
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("TICKDOWN_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("TICKDOWN_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("tickdown-dev")
            } else {
                base_dir.join("tickdown")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
