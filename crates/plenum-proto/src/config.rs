use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mpd: MpdConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Where the daemon lives and how to talk to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MpdConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Sent with `password` right after connecting when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Upper bound on a single request/response round trip.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Delay between two poll cycles.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Delay before the supervisor restarts a session after a fatal error.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_database")]
    pub database: PathBuf,
}

impl Default for MpdConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            password: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
        }
    }
}

fn default_host() -> String {
    platform::DEFAULT_MPD_HOST.to_string()
}

fn default_port() -> u16 {
    platform::DEFAULT_MPD_PORT
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_cooldown_secs() -> u64 {
    5
}

fn default_database() -> PathBuf {
    platform::data_dir().join("album_art.sqlite3")
}

impl MpdConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Floors for the poll and restart delays; zero would spin against the daemon.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const MIN_COOLDOWN: Duration = Duration::from_secs(1);

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms).max(MIN_POLL_INTERVAL)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs).max(MIN_COOLDOWN)
    }
}

impl Config {
    /// Load the default config file, writing one with default values on first run.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mpd: MpdConfig::default(),
            poll: PollConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}
