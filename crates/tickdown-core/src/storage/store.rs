//! Access to the tunable timer settings.
//!
//! The controller only sees a [`ConfigStore`], never the file system, so the
//! same code runs against the on-disk config or an in-memory one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::config::Config;
use crate::error::ConfigError;
use crate::timer::MAX_DISPLAY_DECIMALS;

pub trait ConfigStore: Send {
    /// Current settings. Never fails; unreadable storage yields defaults.
    fn snapshot(&self) -> Config;

    /// Replace the stored settings.
    fn store(&mut self, config: &Config) -> Result<(), ConfigError>;

    fn tick_lead_seconds(&self) -> u32 {
        self.snapshot().timer.tick_lead_seconds
    }

    fn set_tick_lead_seconds(&mut self, seconds: u32) -> Result<(), ConfigError> {
        let mut config = self.snapshot();
        config.timer.tick_lead_seconds = seconds;
        self.store(&config)
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.snapshot().timer.poll_interval_ms.max(1))
    }

    fn display_decimals(&self) -> u8 {
        self.snapshot().timer.display_decimals.min(MAX_DISPLAY_DECIMALS)
    }
}

/// Store persisted to a TOML file.
///
/// The file is re-read on every access, so edits made by another process
/// take effect on the next countdown.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default config location.
    pub fn open_default() -> Result<Self, ConfigError> {
        Ok(Self::new(Config::path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    fn snapshot(&self) -> Config {
        Config::load_from(&self.path).unwrap_or_else(|err| {
            tracing::warn!(%err, path = %self.path.display(), "using default config");
            Config::default()
        })
    }

    fn store(&mut self, config: &Config) -> Result<(), ConfigError> {
        config.validate()?;
        config.save_to(&self.path)?;
        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

/// Store that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    config: Config,
}

impl MemoryConfigStore {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn with_tick_lead_seconds(seconds: u32) -> Self {
        let mut config = Config::default();
        config.timer.tick_lead_seconds = seconds;
        Self { config }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn snapshot(&self) -> Config {
        self.config.clone()
    }

    fn store(&mut self, config: &Config) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config.clone();
        Ok(())
    }
}
