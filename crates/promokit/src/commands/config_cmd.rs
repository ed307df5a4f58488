//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::commands::util::prompt_err;
use crate::config::{self, Config, Defaults, Profile};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// A copy of `cfg` safe to print: plaintext API keys are masked.
fn redacted(cfg: &Config) -> Config {
    let profiles = cfg
        .profiles
        .iter()
        .map(|(name, profile)| {
            let mut profile = profile.clone();
            if profile.api_key.is_some() {
                profile.api_key = Some(REDACTED.into());
            }
            (name.clone(), profile)
        })
        .collect();

    Config {
        default_profile: cfg.default_profile.clone(),
        defaults: Defaults {
            output: cfg.defaults.output.clone(),
            color: cfg.defaults.color.clone(),
            insecure: cfg.defaults.insecure,
            timeout: cfg.defaults.timeout,
        },
        profiles,
    }
}

/// TOML-like view of an already redacted config.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    for name in cfg.profile_names() {
        let Some(p) = cfg.profiles.get(name) else {
            continue;
        };
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "source_url = \"{}\"", p.source_url);
        if let Some(ref redeem) = p.redeem_url {
            let _ = writeln!(out, "redeem_url = \"{redeem}\"");
        }
        if let Some(ref key) = p.api_key {
            let _ = writeln!(out, "api_key = \"{key}\"");
        }
        if let Some(ref env) = p.api_key_env {
            let _ = writeln!(out, "api_key_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out
}

fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

fn validate_url(field: &str, raw: &str) -> Result<(), CliError> {
    url::Url::parse(raw)
        .map(|_| ())
        .map_err(|e| CliError::Validation {
            field: field.into(),
            reason: format!("invalid URL '{raw}': {e}"),
        })
}

fn prompt_api_key() -> Result<String, CliError> {
    let key = rpassword::prompt_password("API key: ").map_err(prompt_err)?;
    if key.is_empty() {
        return Err(CliError::Validation {
            field: "api_key".into(),
            reason: "API key cannot be empty".into(),
        });
    }
    Ok(key)
}

/// Ask where the API key lives. Returns `(api_key, api_key_env)` for the profile.
fn prompt_api_key_storage(
    profile_name: &str,
) -> Result<(Option<String>, Option<String>), CliError> {
    let choices = &[
        "No API key (public endpoints)",
        "Store in system keyring (recommended)",
        "Read from an environment variable",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("API key")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    match selection {
        0 => Ok((None, None)),
        1 => {
            let key = prompt_api_key()?;
            promokit_config::store_api_key(profile_name, &key)?;
            eprintln!("   ✓ API key stored in system keyring");
            Ok((None, None))
        }
        2 => {
            let var: String = Input::new()
                .with_prompt("Environment variable")
                .default("PROMOKIT_SOURCE_KEY".into())
                .interact_text()
                .map_err(prompt_err)?;
            Ok((None, Some(var)))
        }
        _ => Ok((Some(prompt_api_key()?), None)),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("promokit configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let source_url: String = Input::new()
                .with_prompt("Code source URL")
                .interact_text()
                .map_err(prompt_err)?;
            validate_url("source_url", &source_url)?;

            let redeem_url: String = Input::new()
                .with_prompt("Redemption URL (blank: same as source)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;
            let redeem_url = if redeem_url.trim().is_empty() {
                None
            } else {
                validate_url("redeem_url", &redeem_url)?;
                Some(redeem_url)
            };

            let (api_key, api_key_env) = prompt_api_key_storage(&profile_name)?;

            // Keep other profiles when re-running the wizard.
            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(
                profile_name.clone(),
                Profile {
                    source_url,
                    redeem_url,
                    api_key,
                    api_key_env,
                    ..Profile::default()
                },
            );
            cfg.default_profile = Some(profile_name.clone());
            save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: promokit codes list");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            match key.as_str() {
                "source_url" | "source-url" | "source" => {
                    validate_url("source_url", &value)?;
                    profile.source_url = value;
                }
                "redeem_url" | "redeem-url" => {
                    validate_url("redeem_url", &value)?;
                    profile.redeem_url = Some(value);
                }
                "api_key" | "api-key" => profile.api_key = Some(value),
                "api_key_env" | "api-key-env" => profile.api_key_env = Some(value),
                "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
                "insecure" => {
                    profile.insecure = Some(value.parse().map_err(|_| CliError::Validation {
                        field: "insecure".into(),
                        reason: "must be 'true' or 'false'".into(),
                    })?);
                }
                "timeout" => {
                    profile.timeout = Some(value.parse().map_err(|_| CliError::Validation {
                        field: "timeout".into(),
                        reason: "must be a number (seconds)".into(),
                    })?);
                }
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: source_url, redeem_url, \
                             api_key, api_key_env, ca_cert, insecure, timeout"
                        ),
                    });
                }
            }

            save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: promokit config init");
            } else {
                let listing: Vec<String> = cfg
                    .profile_names()
                    .into_iter()
                    .map(|name| {
                        let marker = if name == default { " *" } else { "" };
                        format!("{name}{marker}")
                    })
                    .collect();
                output::print_output(&listing.join("\n"), global.quiet);
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(config::profile_not_found(&name, &cfg));
            }

            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetKey ──────────────────────────────────────────────────
        ConfigCommand::SetKey { name } => {
            let cfg = config::load_config_or_default();
            let profile_name = name.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(config::profile_not_found(&profile_name, &cfg));
            }

            let key = prompt_api_key()?;
            promokit_config::store_api_key(&profile_name, &key)?;
            eprintln!("✓ API key stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn show_masks_plaintext_keys() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "shop".into(),
            Profile {
                source_url: "https://codes.example.com/exec".into(),
                api_key: Some("s3cret".into()),
                ..Profile::default()
            },
        );

        let shown = format_config(&redacted(&cfg));

        assert!(shown.contains("[profiles.shop]"));
        assert!(shown.contains("api_key = \"****\""));
        assert!(!shown.contains("s3cret"));
    }

    #[test]
    fn redacted_keeps_profiles_without_keys() {
        let mut cfg = Config::default();
        cfg.profiles.insert("plain".into(), Profile::default());

        let masked = redacted(&cfg);

        assert_eq!(masked.profiles.len(), 1);
        assert!(masked.profiles["plain"].api_key.is_none());
    }
}
