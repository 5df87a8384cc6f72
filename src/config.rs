use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::SessionError;
use crate::mode::Mode;
use crate::session::{SessionConfig, DEFAULT_COUNTDOWN_SECS, DEFAULT_TARGET_COUNT};

pub const DEFAULT_TICK_RATE_MS: u64 = 16;

/// Keys bound to ring positions, clockwise from the top
pub const TARGET_KEYS: &str = "1234567890qwertyuiopasdfghjklzxcvbnm";
pub const MAX_TARGET_COUNT: usize = TARGET_KEYS.len();

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
    pub target_count: usize,
    pub countdown_secs: u32,
    pub tick_rate_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            target_count: DEFAULT_TARGET_COUNT,
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
        }
    }
}

impl Config {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            target_count: self.target_count,
            countdown_secs: self.countdown_secs,
            duration_override_secs: None,
        }
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.tick_rate_ms == 0 {
            return Err(SessionError::InvalidDuration(0.0));
        }
        // every target needs a key to be struck with
        if self.target_count > MAX_TARGET_COUNT {
            return Err(SessionError::TooManyTargets {
                count: self.target_count,
                max: MAX_TARGET_COUNT,
            });
        }
        self.session_config().validate()
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("reflex_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice::<Config>(&bytes).unwrap_or_else(|e| {
                log::warn!("ignoring unreadable config {}: {e}", self.path.display());
                Config::default()
            }),
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
