// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime configuration.
//!
//! Configuration lives in `config.toml` inside the state directory, next to
//! the queue's storage blob. Every section is optional; missing values fall
//! back to the defaults below.

use std::fs;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use unitq_core::RetryPolicy;

use crate::drain::DrainConfig;
use crate::env;
use crate::error::{Error, Result};

const CONFIG_FILE_NAME: &str = "config.toml";
const STATE_DIR_NAME: &str = "unitq";

/// Name of the drainer's log file inside the state directory.
pub const DRAIN_LOG_NAME: &str = "drain.log";

/// Top-level configuration stored in `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub drain: DrainSettings,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
}

/// Backend the drainer delivers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL; endpoint paths are appended to it.
    #[serde(default = "default_api_url")]
    pub url: String,
    /// Bearer token. `UNITQ_API_TOKEN` takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            url: default_api_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// Request timeout for API calls.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_api_url() -> String {
    "https://api.resgrid.com/api/v4".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Drain loop tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrainSettings {
    /// Seconds between scheduled drain cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Events delivered concurrently per cycle.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// How long a completed event stays visible before it is swept.
    #[serde(default = "default_completed_retention_ms")]
    pub completed_retention_ms: u64,
}

impl Default for DrainSettings {
    fn default() -> Self {
        DrainSettings {
            interval_secs: default_interval_secs(),
            batch_size: default_batch_size(),
            completed_retention_ms: default_completed_retention_ms(),
        }
    }
}

fn default_interval_secs() -> u64 {
    10
}

fn default_batch_size() -> usize {
    3
}

fn default_completed_retention_ms() -> u64 {
    1_000
}

/// Connectivity probing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Address probed for reachability (TCP connect).
    #[serde(default = "default_probe_addr")]
    pub probe_addr: SocketAddr,
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            probe_addr: default_probe_addr(),
            probe_interval_secs: default_probe_interval_secs(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

fn default_probe_addr() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(1, 1, 1, 1), 443))
}

fn default_probe_interval_secs() -> u64 {
    15
}

fn default_probe_timeout_ms() -> u64 {
    3_000
}

impl Config {
    /// Loads `config.toml` from `state_dir`, or defaults if it does not exist.
    ///
    /// `UNITQ_API_URL` and `UNITQ_API_TOKEN` override the file.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let mut config = Self::read(state_dir)?;
        if let Some(url) = env::api_url() {
            config.api.url = url;
        }
        if let Some(token) = env::api_token() {
            config.api.token = Some(token);
        }
        Ok(config)
    }

    /// Reads `config.toml` without applying environment overrides.
    pub fn read(state_dir: &Path) -> Result<Self> {
        let config_path = config_path(state_dir);
        if !config_path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("failed to parse config: {}", e)))
    }

    /// Saves configuration to `state_dir`, creating the directory if needed.
    pub fn save(&self, state_dir: &Path) -> Result<()> {
        fs::create_dir_all(state_dir)?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(config_path(state_dir), content)?;
        Ok(())
    }

    /// Drain loop settings as runtime durations.
    pub fn drain_config(&self) -> DrainConfig {
        DrainConfig {
            interval: Duration::from_secs(self.drain.interval_secs.max(1)),
            batch_size: self.drain.batch_size.max(1),
            completed_retention: Duration::from_millis(self.drain.completed_retention_ms),
        }
    }
}

/// Path of `config.toml` for a state directory.
pub fn config_path(state_dir: &Path) -> PathBuf {
    state_dir.join(CONFIG_FILE_NAME)
}

/// Resolves the state directory.
///
/// Order: the explicit `--state-dir`, `UNITQ_STATE_DIR`,
/// `$XDG_STATE_HOME/unitq`, then `~/.local/state/unitq`.
pub fn resolve_state_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    state_dir_from(
        explicit,
        env::state_dir(),
        env::xdg_state_home(),
        dirs::home_dir(),
    )
    .ok_or(Error::NoStateDir)
}

fn state_dir_from(
    explicit: Option<&Path>,
    state_dir: Option<PathBuf>,
    xdg_state_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(dir) = explicit {
        return Some(dir.to_path_buf());
    }
    if let Some(dir) = state_dir {
        return Some(dir);
    }
    if let Some(xdg) = xdg_state_home {
        return Some(xdg.join(STATE_DIR_NAME));
    }
    home.map(|h| h.join(".local").join("state").join(STATE_DIR_NAME))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
