//! Configuration and credentials for sharenav.
//!
//! TOML config with `SHARENAV_*` environment overrides, translation to
//! `sharenav_core::SessionConfig`, and the keyring-backed
//! [`KeyringCredentials`] provider.

mod credentials;

pub use credentials::{
    KeyringCredentials, KeyringStore, TOKEN_ENV, TokenPrompt, TokenStore, keyring_entry,
};

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use sharenav_core::{ConnectionMode, SessionConfig, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

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

// ── TOML config ─────────────────────────────────────────────────────

/// Top-level `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Directory base URL used for server discovery.
    #[serde(default = "default_directory_url")]
    pub directory_url: String,

    /// Relay base URL used to resolve server addresses.
    #[serde(default = "default_relay_url")]
    pub relay_url: String,

    /// Transport path used at startup: "local" or "remote".
    #[serde(default)]
    pub default_mode: ConnectionMode,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Bound on a pending connect in seconds; 0 waits forever.
    #[serde(default = "default_timeout")]
    pub connect_timeout: u64,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Account name of the identity to sign in with.
    pub identity: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory_url: default_directory_url(),
            relay_url: default_relay_url(),
            default_mode: ConnectionMode::default(),
            timeout: default_timeout(),
            connect_timeout: default_timeout(),
            insecure: false,
            ca_cert: None,
            identity: None,
        }
    }
}

fn default_directory_url() -> String {
    "https://directory.sharenav.app".into()
}
fn default_relay_url() -> String {
    "https://relay.sharenav.app".into()
}
fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Build the runtime session configuration.
    pub fn to_session_config(&self) -> Result<SessionConfig, ConfigError> {
        let directory_url = parse_url("directory_url", &self.directory_url)?;
        let relay_url = parse_url("relay_url", &self.relay_url)?;

        let tls = if self.insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsVerification::CustomCa(ca_path.clone())
        } else {
            TlsVerification::SystemDefaults
        };

        let mut session = SessionConfig::new(directory_url, relay_url);
        session.tls = tls;
        session.timeout = Duration::from_secs(self.timeout);
        session.connect_timeout =
            (self.connect_timeout > 0).then(|| Duration::from_secs(self.connect_timeout));
        session.default_mode = self.default_mode;
        Ok(session)
    }
}

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("app", "sharenav", "sharenav").map_or_else(
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
    p.push("sharenav");
    p
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load the config from the canonical path and the environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` merged with `SHARENAV_*` variables.
/// A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SHARENAV_").ignore(&["token"]));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Saving ──────────────────────────────────────────────────────────

/// Write the config to the canonical path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

/// Serialize `cfg` as TOML and write it to `path`, creating parent dirs.
pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
