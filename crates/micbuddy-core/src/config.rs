//! Configuration management for micbuddy.
//!
//! Holds the OBS connection settings, animation tuning and the persisted
//! overlay position. Only non-default values are written back to disk.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::APP_NAME;

/// Screen position of the overlay's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct WindowPosition {
    pub x: i32,
    pub y: i32,
}

/// Core configuration structure for the application.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Host running obs-websocket
    #[serde(default = "default_host", skip_serializing_if = "is_default_host")]
    pub host: String,

    /// obs-websocket port
    #[serde(default = "default_port", skip_serializing_if = "is_default_port")]
    pub port: u16,

    /// obs-websocket server password, if authentication is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Handshake timeout (in seconds)
    #[serde(
        default = "default_connect_timeout",
        skip_serializing_if = "is_default_connect_timeout"
    )]
    pub connect_timeout: f32,

    /// Timeout for a single request once connected (in seconds)
    #[serde(
        default = "default_call_timeout",
        skip_serializing_if = "is_default_call_timeout"
    )]
    pub call_timeout: f32,

    /// Time between connection checks and mute polls (in seconds)
    #[serde(
        default = "default_poll_interval",
        skip_serializing_if = "is_default_poll_interval"
    )]
    pub poll_interval: f32,

    /// How fast the face fades between muted and live, in levels per second
    #[serde(
        default = "default_fade_speed",
        skip_serializing_if = "is_default_fade_speed"
    )]
    pub fade_speed: f32,

    /// Last position the overlay was dragged to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<WindowPosition>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn is_default_host(v: &str) -> bool {
    v == "localhost"
}

fn default_port() -> u16 {
    4455
}

fn is_default_port(v: &u16) -> bool {
    *v == 4455
}

fn default_connect_timeout() -> f32 {
    5.0
}

fn is_default_connect_timeout(v: &f32) -> bool {
    (*v - 5.0).abs() < f32::EPSILON
}

fn default_call_timeout() -> f32 {
    2.0
}

fn is_default_call_timeout(v: &f32) -> bool {
    (*v - 2.0).abs() < f32::EPSILON
}

fn default_poll_interval() -> f32 {
    1.0
}

fn is_default_poll_interval(v: &f32) -> bool {
    (*v - 1.0).abs() < f32::EPSILON
}

fn default_fade_speed() -> f32 {
    3.0
}

fn is_default_fade_speed(v: &f32) -> bool {
    (*v - 3.0).abs() < f32::EPSILON
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            password: None,
            connect_timeout: default_connect_timeout(),
            call_timeout: default_call_timeout(),
            poll_interval: default_poll_interval(),
            fade_speed: default_fade_speed(),
            position: None,
        }
    }
}

impl Config {
    /// Get the obs-websocket password
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Get the handshake timeout as a Duration
    pub fn connect_timeout(&self) -> Duration {
        secs(self.connect_timeout)
    }

    /// Get the per-request timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        secs(self.call_timeout)
    }

    /// Get the tick interval as a Duration
    pub fn poll_interval(&self) -> Duration {
        secs(self.poll_interval)
    }

    /// Get the saved overlay position
    pub fn position(&self) -> Option<WindowPosition> {
        self.position
    }

    /// Remember a new overlay position
    pub fn set_position(&mut self, x: i32, y: i32) {
        self.position = Some(WindowPosition { x, y });
    }
}

/// Longest duration any timing setting may take.
const MAX_DURATION: Duration = Duration::from_secs(60 * 60);

/// Non-positive or non-finite values fall back to a 100ms floor; anything
/// longer than an hour is capped.
fn secs(v: f32) -> Duration {
    if !(v.is_finite() && v > 0.0) {
        return Duration::from_millis(100);
    }
    Duration::try_from_secs_f32(v)
        .unwrap_or(MAX_DURATION)
        .min(MAX_DURATION)
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new ConfigManager with the default configuration directory.
    pub fn new() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Ok(Self { config_path })
    }

    /// Creates a new ConfigManager with a specified configuration directory.
    #[cfg(test)]
    pub fn with_config_dir<P: AsRef<std::path::Path>>(dir: P) -> Self {
        let config_path = dir.as_ref().join(format!("{}.toml", APP_NAME));
        Self { config_path }
    }

    /// Returns the default path to the configuration file.
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to retrieve configuration directory")?;
        Ok(config_dir
            .join(APP_NAME)
            .join(format!("{}.toml", APP_NAME)))
    }

    /// Loads the configuration from the config file or returns default.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let config_content = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file at {:?}", self.config_path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file at {:?}", self.config_path))?;

        debug!(path = ?self.config_path, "loaded config");
        Ok(config)
    }

    /// Saves the configuration to the config file.
    pub fn save(&self, config: &Config) -> Result<()> {
        let config_dir = self
            .config_path
            .parent()
            .with_context(|| format!("Failed to get parent directory of {:?}", self.config_path))?;

        fs::create_dir_all(config_dir)
            .with_context(|| format!("Failed to create config directory at {:?}", config_dir))?;

        let serialized =
            toml::to_string_pretty(&config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, serialized)
            .with_context(|| format!("Failed to write config file at {:?}", self.config_path))?;

        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path(&self) -> &std::path::Path {
        &self.config_path
    }
}
