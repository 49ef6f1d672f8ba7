//! Shared configuration for the tenants CLI.
//!
//! TOML profiles, token resolution (env + plaintext + keyring), and
//! translation to a ready-to-use `tenants_api::TenantsClient`.

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

use tenants_api::{
    Credentials, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, TenantsClient, TlsMode, TransportConfig,
};

/// Keyring service name for stored tokens.
pub const KEYRING_SERVICE: &str = "tenants";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String, available: Vec<String> },

    #[error("profile '{profile}' has a {present} but no {missing}")]
    IncompleteCredentials {
        profile: String,
        present: &'static str,
        missing: &'static str,
    },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to build client: {0}")]
    Client(#[from] tenants_api::Error),

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

    /// Named server profiles.
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
    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.profile_names(),
            })
    }

    /// Sorted profile names.
    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// A named server profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// API base URL (e.g., "http://localhost:5105/api").
    #[serde(default = "default_server")]
    pub server: String,

    /// Bearer token (plaintext, prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the bearer token.
    pub token_env: Option<String>,

    /// Refresh token (plaintext, prefer keyring or env var).
    pub refresh_token: Option<String>,

    /// Environment variable name containing the refresh token.
    pub refresh_token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override listing page size.
    pub page_size: Option<u32>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            server: default_server(),
            token: None,
            token_env: None,
            refresh_token: None,
            refresh_token_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
            page_size: None,
        }
    }
}

fn default_server() -> String {
    DEFAULT_BASE_URL.into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "tenants", "tenants").map_or_else(
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
    p.push("tenants");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load Config from `path` layered over defaults and `TENANTS_CONFIG_*`
/// environment variables (`__` separates nested keys, e.g.
/// `TENANTS_CONFIG_DEFAULTS__TIMEOUT=10`). A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TENANTS_CONFIG_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

fn keyring_user(profile_name: &str, kind: &str) -> String {
    format!("{profile_name}/{kind}")
}

/// Look up one token: env var named by the profile → plaintext → keyring.
fn resolve_secret(
    env_name: Option<&str>,
    plaintext: Option<&str>,
    profile_name: &str,
    kind: &str,
) -> Option<SecretString> {
    // 1. Env var named by the profile
    if let Some(env_name) = env_name {
        if let Ok(val) = std::env::var(env_name) {
            if !val.is_empty() {
                return Some(SecretString::from(val));
            }
        }
    }

    // 2. Plaintext in config
    if let Some(val) = plaintext {
        if !val.is_empty() {
            return Some(SecretString::from(val.to_owned()));
        }
    }

    // 3. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name, kind)) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    None
}

/// Resolve the token pair for a profile.
///
/// `Ok(None)` means no tokens are configured at all (anonymous access).
/// Having only one half of the pair is an error.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<Credentials>, ConfigError> {
    let token = resolve_secret(
        profile.token_env.as_deref(),
        profile.token.as_deref(),
        profile_name,
        "token",
    );
    let refresh = resolve_secret(
        profile.refresh_token_env.as_deref(),
        profile.refresh_token.as_deref(),
        profile_name,
        "refresh-token",
    );

    match (token, refresh) {
        (Some(token), Some(refresh)) => Ok(Some(Credentials::new(token, refresh)?)),
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::IncompleteCredentials {
            profile: profile_name.into(),
            present: "token",
            missing: "refresh token",
        }),
        (None, Some(_)) => Err(ConfigError::IncompleteCredentials {
            profile: profile_name.into(),
            present: "refresh token",
            missing: "token",
        }),
    }
}

/// Store a token pair in the system keyring for `profile_name`.
pub fn store_credentials(
    profile_name: &str,
    token: &str,
    refresh_token: &str,
) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name, "token"))?
        .set_password(token)?;
    keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name, "refresh-token"))?
        .set_password(refresh_token)?;
    Ok(())
}

// ── Client construction ─────────────────────────────────────────────

/// Transport settings for a profile, with global defaults filling gaps.
pub fn transport_config(profile: &Profile, defaults: &Defaults) -> TransportConfig {
    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    TransportConfig::default()
        .with_tls(tls)
        .with_timeout(Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)))
}

/// Validate a server URL string.
pub fn parse_server(server: &str) -> Result<url::Url, ConfigError> {
    server.parse().map_err(|_| ConfigError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {server}"),
    })
}

/// Build a `TenantsClient` from a profile, with credentials attached when
/// the profile has any.
pub fn profile_to_client(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<TenantsClient, ConfigError> {
    let server = parse_server(&profile.server)?;
    let client = TenantsClient::new(server.as_str(), &transport_config(profile, defaults))?;

    match resolve_credentials(profile, profile_name)? {
        Some(creds) => Ok(client.with_auth(&creds)?),
        None => Ok(client),
    }
}
