//! Config subcommand handlers.

use std::fmt::Write as _;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking token fields.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "page_size = {}", cfg.defaults.page_size);

    for name in cfg.profile_names() {
        let p = &cfg.profiles[&name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "server = \"{}\"", p.server);
        if p.token.is_some() {
            let _ = writeln!(out, "token = \"****\"");
        }
        if let Some(ref env) = p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        if p.refresh_token.is_some() {
            let _ = writeln!(out, "refresh_token = \"****\"");
        }
        if let Some(ref env) = p.refresh_token_env {
            let _ = writeln!(out, "refresh_token_env = \"{env}\"");
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
        if let Some(page_size) = p.page_size {
            let _ = writeln!(out, "page_size = {page_size}");
        }
    }

    out.trim_end().to_owned()
}

/// Serialized config with token values replaced, for structured output.
fn config_value_redacted(cfg: &Config) -> Result<serde_json::Value, CliError> {
    let mut value = serde_json::to_value(cfg)?;
    if let Some(profiles) = value.get_mut("profiles").and_then(|p| p.as_object_mut()) {
        for profile in profiles.values_mut().filter_map(|p| p.as_object_mut()) {
            for key in ["token", "refresh_token"] {
                if profile.get(key).is_some_and(|v| !v.is_null()) {
                    profile.insert(key.into(), "****".into());
                }
            }
        }
    }
    Ok(value)
}

fn parse_field<T: std::str::FromStr>(field: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("must be {expected}"),
    })
}

/// Apply `key = value` to a profile.
fn set_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "server" => {
            tenants_config::parse_server(&value)?;
            profile.server = value;
        }
        "token_env" | "token-env" => profile.token_env = Some(value),
        "refresh_token_env" | "refresh-token-env" => profile.refresh_token_env = Some(value),
        "insecure" => profile.insecure = Some(parse_field("insecure", &value, "'true' or 'false'")?),
        "timeout" => profile.timeout = Some(parse_field("timeout", &value, "a number (seconds)")?),
        "page_size" | "page-size" => {
            let size: u32 = parse_field("page_size", &value, "a positive number")?;
            if size == 0 {
                return Err(CliError::Validation {
                    field: "page_size".into(),
                    reason: "must be a positive number".into(),
                });
            }
            profile.page_size = Some(size);
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: server, token_env, \
                     refresh_token_env, insecure, timeout, page_size, ca_cert"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let value = config_value_redacted(&cfg)?;
            let out = output::render_single(
                &global.output,
                &value,
                |_| format_config_redacted(&cfg),
                |_| "config".into(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            set_profile_key(profile, &key, value)?;

            config::save_config(&cfg)?;
            output::notice_ok(&format!("Set {key} on profile '{profile_name}'"), color, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            let names = cfg.profile_names();
            if names.is_empty() {
                output::notice_info(
                    "No profiles configured. Run: tenants config set server <url>",
                    color,
                    global.quiet,
                );
            } else {
                let lines: Vec<String> = names
                    .iter()
                    .map(|name| {
                        let marker = if name == default { " *" } else { "" };
                        format!("{name}{marker}")
                    })
                    .collect();
                output::print_output(&lines.join("\n"), global.quiet);
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            cfg.profile(&name)?;
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::notice_ok(&format!("Default profile set to '{name}'"), color, global.quiet);
            Ok(())
        }

        ConfigCommand::SetToken => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let token = rpassword::prompt_password("Token: ").map_err(prompt_err)?;
            let refresh = rpassword::prompt_password("Refresh token: ").map_err(prompt_err)?;
            if token.is_empty() || refresh.is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "token and refresh token cannot be empty".into(),
                });
            }

            tenants_config::store_credentials(&profile_name, &token, &refresh)?;
            output::notice_ok(
                &format!("Tokens stored in system keyring for profile '{profile_name}'"),
                color,
                global.quiet,
            );
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn redacted_config_masks_tokens() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "prod".into(),
            Profile {
                server: "https://tenants.example.com/api".into(),
                token: Some("secret-token".into()),
                refresh_token: Some("secret-refresh".into()),
                page_size: Some(10),
                ..Profile::default()
            },
        );

        let out = format_config_redacted(&cfg);
        assert!(out.contains("[profiles.prod]"));
        assert!(out.contains("token = \"****\""));
        assert!(out.contains("page_size = 10"));
        assert!(!out.contains("secret-token"));
        assert!(!out.contains("secret-refresh"));
    }

    #[test]
    fn structured_config_masks_tokens() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "prod".into(),
            Profile {
                token: Some("secret-token".into()),
                refresh_token: Some("secret-refresh".into()),
                ..Profile::default()
            },
        );
        cfg.profiles.insert("local".into(), Profile::default());

        let value = config_value_redacted(&cfg).unwrap();
        assert_eq!(value["profiles"]["prod"]["token"], "****");
        assert_eq!(value["profiles"]["prod"]["refresh_token"], "****");
        assert!(value["profiles"]["local"]["token"].is_null());
    }

    #[test]
    fn set_known_keys() {
        let mut profile = Profile::default();
        set_profile_key(&mut profile, "server", "https://x.example/api".into()).unwrap();
        set_profile_key(&mut profile, "page-size", "25".into()).unwrap();
        set_profile_key(&mut profile, "insecure", "true".into()).unwrap();
        assert_eq!(profile.server, "https://x.example/api");
        assert_eq!(profile.page_size, Some(25));
        assert_eq!(profile.insecure, Some(true));
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut profile = Profile::default();
        assert!(set_profile_key(&mut profile, "timeout", "soon".into()).is_err());
        assert!(set_profile_key(&mut profile, "page_size", "0".into()).is_err());
        assert!(set_profile_key(&mut profile, "server", "not a url".into()).is_err());
        assert!(set_profile_key(&mut profile, "colour", "red".into()).is_err());
    }
}
