//! Shared configuration for the qbfleet CLI.
//!
//! TOML host entries, credential resolution (env + keyring +
//! plaintext), and translation to `qbfleet_core::HostConnection`.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use qbfleet_api::TransportConfig;
use qbfleet_core::{HostConnection, HostId, MonitorConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for host '{host}'")]
    NoCredentials { host: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Health monitor tuning.
    #[serde(default)]
    pub monitor: MonitorSection,

    /// Configured qBittorrent hosts.
    #[serde(default)]
    pub hosts: Vec<HostEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Read timeout for API calls, seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Timeout for torrent file uploads, seconds.
    #[serde(default = "default_upload_timeout")]
    pub upload_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            upload_timeout: default_upload_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_upload_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MonitorSection {
    /// Seconds between probe passes.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Consecutive failed probes before a host flips offline.
    #[serde(default = "default_offline_after")]
    pub offline_after: u32,

    /// Samples to retain per host. Advisory; enforcement belongs to
    /// the sink implementation.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            offline_after: default_offline_after(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_interval() -> u64 {
    300
}
fn default_offline_after() -> u32 {
    1
}
fn default_history_limit() -> usize {
    100
}

/// One configured host.
#[derive(Debug, Deserialize, Serialize)]
pub struct HostEntry {
    /// Stable identity; generated when absent.
    pub id: Option<String>,

    /// Display name, also the keyring lookup key.
    pub name: String,

    /// Hostname or IP of the WebUI.
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub username: String,

    /// Password in plaintext (prefer keyring or `password_env`).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_port() -> u16 {
    8080
}
fn default_enabled() -> bool {
    true
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "qbfleet", "qbfleet").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("qbfleet");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from a specific file + environment.
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("QBFLEET_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load the full Config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a host's password from the credential chain.
pub fn resolve_password(entry: &HostEntry) -> Result<SecretString, ConfigError> {
    // 1. Entry's password_env → env var lookup
    if let Some(ref env_name) = entry.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(keyring_entry) = keyring::Entry::new("qbfleet", &format!("{}/password", entry.name)) {
        if let Ok(pw) = keyring_entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = entry.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        host: entry.name.clone(),
    })
}

// ── Translation to core types ───────────────────────────────────────

impl Config {
    /// Transport settings for API clients.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: Duration::from_secs(self.defaults.timeout),
            upload_timeout: Duration::from_secs(self.defaults.upload_timeout),
        }
    }

    /// Monitor settings for the health prober.
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            interval: Duration::from_secs(self.monitor.interval_secs),
            offline_after: self.monitor.offline_after,
        }
    }

    /// Resolve every host entry into a connection, including disabled
    /// ones (filtering happens at aggregation time).
    pub fn connections(&self) -> Result<Vec<HostConnection>, ConfigError> {
        self.hosts
            .iter()
            .map(|entry| {
                if entry.host.trim().is_empty() {
                    return Err(ConfigError::Validation {
                        field: "host".into(),
                        reason: format!("empty address for host '{}'", entry.name),
                    });
                }
                let password = resolve_password(entry)?;
                Ok(HostConnection {
                    id: entry
                        .id
                        .as_deref()
                        .map_or_else(HostId::random, HostId::new),
                    name: entry.name.clone(),
                    host: entry.host.clone(),
                    port: entry.port,
                    username: entry.username.clone(),
                    password,
                    enabled: entry.enabled,
                })
            })
            .collect()
    }
}
