//! Shared configuration for robopanel front-ends.
//!
//! TOML profiles, credential resolution (env + plaintext), and translation
//! to `robopanel_api::StoreConfig` / `robopanel_core::SyncConfig`. The CLI
//! adds flag-aware overrides on top.

use std::collections::HashMap;
use std::net::SocketAddr;
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

use robopanel_api::{ProbeMonitor, StoreConfig};
use robopanel_core::SyncConfig;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found in configuration")]
    ProfileNotFound { profile: String },

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
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named store profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named store profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Store base URL (e.g. `https://minrobot.example.firebasedatabase.app/`).
    pub database_url: String,

    /// Access token (plaintext — prefer the env var).
    pub auth_token: Option<String>,

    /// Environment variable name containing the access token.
    pub auth_token_env: Option<String>,

    /// Admin id presented on the emergency channel.
    pub admin_id: Option<String>,

    /// Reachability probe target (`host:port`).
    pub probe_addr: Option<String>,

    /// Settle delay before attaching subscriptions, in milliseconds.
    pub settle_delay_ms: Option<u64>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "minrobot", "robopanel").map_or_else(
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
    p.push("robopanel");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load a Config from an explicit path + environment (`ROBOPANEL_*`).
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ROBOPANEL_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

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

// ── Resolution ──────────────────────────────────────────────────────

/// Resolve the access token from the credential chain: env var named by
/// the profile, then plaintext. `None` when the store is open.
pub fn resolve_auth_token(profile: &Profile) -> Option<SecretString> {
    if let Some(ref env_name) = profile.auth_token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }
    profile
        .auth_token
        .as_ref()
        .map(|token| SecretString::from(token.clone()))
}

/// Build a `StoreConfig` from a profile.
pub fn profile_to_store_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<StoreConfig, ConfigError> {
    let url: url::Url = profile
        .database_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: format!("profiles.{profile_name}.database_url"),
            reason: format!("invalid URL: {}", profile.database_url),
        })?;

    let mut config =
        StoreConfig::new(url).with_timeout(Duration::from_secs(profile.timeout.unwrap_or(30)));
    if let Some(token) = resolve_auth_token(profile) {
        config = config.with_auth_token(token);
    }
    Ok(config)
}

/// Build the synchronizer tuning from a profile.
pub fn profile_to_sync_config(profile: &Profile) -> SyncConfig {
    match profile.settle_delay_ms {
        Some(ms) => SyncConfig {
            settle_delay: Duration::from_millis(ms),
        },
        None => SyncConfig::default(),
    }
}

/// Build the reachability probe from a profile.
pub fn profile_to_probe(profile: &Profile, profile_name: &str) -> Result<ProbeMonitor, ConfigError> {
    match profile.probe_addr {
        Some(ref addr) => {
            let addr: SocketAddr = addr.parse().map_err(|_| ConfigError::Validation {
                field: format!("profiles.{profile_name}.probe_addr"),
                reason: format!("expected host:port, got '{addr}'"),
            })?;
            Ok(ProbeMonitor::new(addr, Duration::from_millis(800)))
        }
        None => Ok(ProbeMonitor::default()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = r#"
        default_profile = "bench"

        [defaults]
        output = "json"
        timeout = 10

        [profiles.bench]
        database_url = "https://minrobot.example.app/"
        admin_id = "supervisor"
        settle_delay_ms = 250
        probe_addr = "192.168.1.1:53"
    "#;

    fn write_sample() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        (dir, path)
    }

    #[test]
    fn sample_config_parses_with_defaults_filled() {
        let (_dir, path) = write_sample();
        let config = load_config_from(&path).unwrap();

        assert_eq!(config.default_profile.as_deref(), Some("bench"));
        assert_eq!(config.defaults.output, "json");
        assert_eq!(config.defaults.color, "auto");
        assert_eq!(config.defaults.timeout, 10);

        let profile = &config.profiles["bench"];
        assert_eq!(profile.admin_id.as_deref(), Some("supervisor"));
    }

    #[test]
    fn profile_resolves_to_store_and_sync_config() {
        let (_dir, path) = write_sample();
        let config = load_config_from(&path).unwrap();
        let profile = &config.profiles["bench"];

        let store = profile_to_store_config(profile, "bench").unwrap();
        assert_eq!(store.base_url.as_str(), "https://minrobot.example.app/");
        assert!(store.auth_token.is_none());

        let sync = profile_to_sync_config(profile);
        assert_eq!(sync.settle_delay, Duration::from_millis(250));

        assert!(profile_to_probe(profile, "bench").is_ok());
    }

    #[test]
    fn invalid_database_url_is_a_validation_error() {
        let profile = Profile {
            database_url: "not a url".into(),
            ..Profile::default()
        };
        let err = profile_to_store_config(&profile, "broken").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn plaintext_token_resolves_when_no_env_is_set() {
        let profile = Profile {
            database_url: "https://x.example/".into(),
            auth_token: Some("plain".into()),
            ..Profile::default()
        };
        assert!(resolve_auth_token(&profile).is_some());
    }
}
