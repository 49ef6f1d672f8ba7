//! Profile selection and client construction for the CLI.
//!
//! Thin layer over `tenants_config`: picks the active profile and applies
//! the global flag overrides before the client is built.

use tenants_api::TenantsClient;
pub use tenants_config::{Config, Profile, config_path, load_config_or_default, save_config};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// A client ready for use, plus the settings commands still need.
pub struct Session {
    pub client: TenantsClient,
    pub profile_name: String,
    pub page_size: u32,
}

/// Build a client from the config file, the active profile and CLI flags.
///
/// An explicit `--profile` must exist in the config. The implicit default
/// profile may be absent, in which case the built-in server address and
/// anonymous access apply unless flags say otherwise.
pub fn build_session(global: &GlobalOpts) -> Result<Session, CliError> {
    let mut cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.remove(&profile_name) {
        Some(profile) => profile,
        None if global.profile.is_some() => {
            return Err(tenants_config::ConfigError::ProfileNotFound {
                name: profile_name,
                available: cfg.profile_names(),
            }
            .into());
        }
        None => Profile::default(),
    };
    let profile = apply_overrides(profile, global);
    let page_size = profile.page_size.unwrap_or(cfg.defaults.page_size);

    tracing::debug!(profile = %profile_name, server = %profile.server, "building client");
    let client = tenants_config::profile_to_client(&profile, &profile_name, &cfg.defaults)?;

    Ok(Session {
        client,
        profile_name,
        page_size,
    })
}

/// Layer flag / env overrides (flag > env > profile) onto a profile.
fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref server) = global.server {
        profile.server.clone_from(server);
    }
    if let Some(ref token) = global.token {
        profile.token = Some(token.clone());
        profile.token_env = None;
    }
    if let Some(ref refresh) = global.refresh_token {
        profile.refresh_token = Some(refresh.clone());
        profile.refresh_token_env = None;
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }
    profile
}
