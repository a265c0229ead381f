//! Configuration loading for wakeboost.
//!
//! Reads `~/.wakeboost/config.toml`. Every section and field is optional;
//! a missing file means "run with defaults".
//!
//! ```toml
//! [boost]
//! wake_boost_ms = 2000
//! initial_boost_ms = 0
//!
//! [cpufreq]
//! sysfs_root = "/sys/devices/system/cpu"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use wakeboost_types::BoostDuration;

/// Where cpufreq lives on a stock Linux system.
pub const DEFAULT_SYSFS_ROOT: &str = "/sys/devices/system/cpu";

#[derive(Debug, Default, Deserialize)]
pub struct WakeBoostConfig {
    pub boost: Option<BoostConfig>,
    pub cpufreq: Option<CpuFreqConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BoostConfig {
    /// Window armed on every display wake. Default: 2000.
    pub wake_boost_ms: Option<BoostDuration>,
    /// Value the runtime parameter reports before anything writes it. Default: 0.
    pub initial_boost_ms: Option<BoostDuration>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CpuFreqConfig {
    /// Directory holding `online` and the `cpuN/cpufreq/` trees.
    pub sysfs_root: Option<PathBuf>,
}

/// Fully-resolved settings with defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub wake_boost: BoostDuration,
    pub initial_boost: BoostDuration,
    pub sysfs_root: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wake_boost: BoostDuration::WAKE_DEFAULT,
            initial_boost: BoostDuration::default(),
            sysfs_root: PathBuf::from(DEFAULT_SYSFS_ROOT),
        }
    }
}

impl WakeBoostConfig {
    /// Load from the default location.
    ///
    /// `Ok(None)` when there is no home directory or no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let path = match config_path() {
            Some(path) => path,
            None => return Ok(None),
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn settings(&self) -> Settings {
        let defaults = Settings::default();
        let boost = self.boost.as_ref();
        Settings {
            wake_boost: boost
                .and_then(|b| b.wake_boost_ms)
                .unwrap_or(defaults.wake_boost),
            initial_boost: boost
                .and_then(|b| b.initial_boost_ms)
                .unwrap_or(defaults.initial_boost),
            sysfs_root: self
                .cpufreq
                .as_ref()
                .and_then(|c| c.sysfs_root.clone())
                .unwrap_or(defaults.sysfs_root),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".wakeboost").join("config.toml"))
}
