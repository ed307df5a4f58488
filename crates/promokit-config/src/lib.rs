//! Shared configuration for promokit tools.
//!
//! TOML profiles, API key resolution (env + keyring + plaintext),
//! and translation to `promokit_core::DeskConfig`. The CLI adds
//! flag-aware overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use promokit_core::{DeskConfig, TlsVerification};

/// Keyring service name; entries are `<profile>/api-key`.
pub const KEYRING_SERVICE: &str = "promokit";
/// Environment prefix for config overrides, e.g. `PROMOKIT_DEFAULT_PROFILE`
/// or `PROMOKIT_DEFAULTS__TIMEOUT`.
pub const ENV_PREFIX: &str = "PROMOKIT_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

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

    /// Named collaborator profiles.
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

impl Config {
    /// The profile to use: `requested`, else `default_profile`, else `"default"`.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }

    /// Profile names, sorted.
    pub fn profile_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
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

/// A named pair of collaborator endpoints.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Code source URL (GET).
    pub source_url: String,

    /// Redemption sink URL (POST). Defaults to `source_url`.
    pub redeem_url: Option<String>,

    /// API key (plaintext; prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "promokit", "promokit").map_or_else(
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
    p.push("promokit");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file just means defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── API key resolution (without CLI flags) ──────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/api-key"))
}

/// Resolve the collaborator API key, if any is configured.
///
/// Order: the profile's `api_key_env` variable, the system keyring, then
/// the plaintext `api_key`. The key is optional: public deployments have
/// none.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's api_key_env → env var lookup
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
        debug!(var = %env_name, "api_key_env not set, falling back");
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    profile
        .api_key
        .as_ref()
        .map(|key| SecretString::from(key.clone()))
}

/// Store an API key for `profile_name` in the system keyring.
pub fn store_api_key(profile_name: &str, key: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(key)?;
    Ok(())
}

// ── DeskConfig construction ─────────────────────────────────────────

pub(crate) fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    raw.parse().map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })
}

/// Build a `DeskConfig` from a profile, with no CLI flag overrides.
pub fn profile_to_desk_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<DeskConfig, ConfigError> {
    let source_url = parse_url("source_url", &profile.source_url)?;
    let redeem_url = match profile.redeem_url.as_deref() {
        Some(raw) => parse_url("redeem_url", raw)?,
        None => source_url.clone(),
    };

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(DeskConfig {
        source_url,
        redeem_url,
        api_key: resolve_api_key(profile, profile_name),
        tls,
        timeout,
    })
}
