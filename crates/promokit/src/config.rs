//! CLI configuration: a thin wrapper around `promokit_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--source, --redeem-url, --api-key, --insecure, --timeout).

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use promokit_core::{DeskConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use promokit_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// `ProfileNotFound` listing what is configured.
pub fn profile_not_found(name: &str, config: &Config) -> CliError {
    let available = config.profile_names();
    CliError::ProfileNotFound {
        name: name.into(),
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

/// Build the `DeskConfig` for a command: profile first, flags on top.
///
/// With no matching profile, `--source` alone is enough.
pub fn build_desk_config(global: &GlobalOpts) -> Result<DeskConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, &cfg.defaults, global);
    }

    // An explicitly requested profile must exist.
    if global.profile.is_some() && global.source.is_none() {
        return Err(profile_not_found(&profile_name, &cfg));
    }

    let source = global.source.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;

    let mut desk = DeskConfig::new(parse_url("source", source)?);
    desk.timeout = Duration::from_secs(cfg.defaults.timeout);
    if cfg.defaults.insecure {
        desk.tls = TlsVerification::DangerAcceptInvalid;
    }
    apply_overrides(&mut desk, global)?;
    Ok(desk)
}

/// Translate a `Profile` + global flags into a `DeskConfig`.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<DeskConfig, CliError> {
    let mut desk = promokit_config::profile_to_desk_config(profile, profile_name, defaults)?;

    // A flag-supplied source also becomes the default redeem URL.
    if let Some(ref source) = global.source {
        let url = parse_url("source", source)?;
        if profile.redeem_url.is_none() {
            desk.redeem_url = url.clone();
        }
        desk.source_url = url;
    }
    apply_overrides(&mut desk, global)?;
    Ok(desk)
}

fn apply_overrides(desk: &mut DeskConfig, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(ref redeem) = global.redeem_url {
        desk.redeem_url = parse_url("redeem-url", redeem)?;
    }
    if let Some(ref key) = global.api_key {
        desk.api_key = Some(SecretString::from(key.clone()));
    }
    if global.insecure {
        desk.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        desk.timeout = Duration::from_secs(secs);
    }
    Ok(())
}

fn parse_url(field: &str, raw: &str) -> Result<Url, CliError> {
    raw.parse().map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })
}
