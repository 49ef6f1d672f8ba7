//! CLI error types with miette diagnostics.
//!
//! Maps transport, configuration and API errors into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use tenants_api::ApiError;
use tenants_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const API: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the tenants API at {url}")]
    #[diagnostic(
        code(tenants::connection_failed),
        help(
            "Check that the API is running and reachable.\n\
             Override the address with --server or: tenants config set server <url>"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: tenants_api::Error,
    },

    #[error("Request to {url} failed")]
    #[diagnostic(
        code(tenants::request_failed),
        help("The server accepted the connection but the exchange did not complete. Retry with -vv for details.")
    )]
    RequestFailed {
        url: String,
        #[source]
        source: tenants_api::Error,
    },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(tenants::timeout),
        help("Increase the timeout with --timeout or: tenants config set timeout <seconds>")
    )]
    Timeout {
        url: String,
        #[source]
        source: tenants_api::Error,
    },

    #[error("TLS setup failed: {reason}")]
    #[diagnostic(
        code(tenants::tls_error),
        help("Use --insecure (-k) to accept any certificate, or set ca_cert in your profile.")
    )]
    Tls { reason: String },

    #[error("Unexpected response from the server: {message}")]
    #[diagnostic(code(tenants::bad_response))]
    BadResponse { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(tenants::auth_failed),
        help(
            "Check the token pair for profile '{profile}'.\n\
             Run: tenants config set-token --profile {profile}"
        )
    )]
    AuthFailed { message: String, profile: String },

    #[error("Profile '{profile}' has a {present} but no {missing}")]
    #[diagnostic(
        code(tenants::incomplete_credentials),
        help(
            "Both tokens are sent on every request.\n\
             Pass --token and --refresh-token together, or run: tenants config set-token"
        )
    )]
    IncompleteCredentials {
        profile: String,
        present: String,
        missing: String,
    },

    // ── Resources ────────────────────────────────────────────────────

    #[error("Tenant '{identifier}' not found")]
    #[diagnostic(
        code(tenants::not_found),
        help("Run: tenants list to see available tenants")
    )]
    NotFound { identifier: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error{}: {message}", .status.map_or_else(String::new, |s| format!(" ({s})")))]
    #[diagnostic(code(tenants::api_error))]
    Api {
        message: String,
        status: Option<u16>,
        /// Field-level messages from the error envelope, one per line.
        #[help]
        details: Option<String>,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(tenants::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(tenants::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: tenants config set server <url> --profile {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Keyring error: {reason}")]
    #[diagnostic(code(tenants::keyring))]
    Keyring { reason: String },

    #[error(transparent)]
    #[diagnostic(code(tenants::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(tenants::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(tenants::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(tenants::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::RequestFailed { .. } | Self::Tls { .. } => {
                exit_code::CONNECTION
            }
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::IncompleteCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Api { .. } | Self::BadResponse { .. } => exit_code::API,
            Self::Validation { .. }
            | Self::ProfileNotFound { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Translate an error envelope returned by the API.
    ///
    /// `identifier` names the tenant the request targeted, if any, so a 404
    /// can point at it.
    pub fn from_api(err: ApiError, identifier: Option<&str>, profile: &str) -> Self {
        if err.is_unauthorized() {
            return Self::AuthFailed {
                message: err.message,
                profile: profile.into(),
            };
        }
        if let (true, Some(id)) = (err.is_not_found(), identifier) {
            return Self::NotFound {
                identifier: id.into(),
            };
        }
        Self::Api {
            message: err.message,
            status: err.status_code,
            details: (!err.errors.is_empty()).then(|| err.errors.join("\n")),
        }
    }
}

// ── tenants_api::Error → CliError mapping ────────────────────────────

impl From<tenants_api::Error> for CliError {
    fn from(err: tenants_api::Error) -> Self {
        let url = match &err {
            tenants_api::Error::Transport(e) => e.url().map(ToString::to_string),
            _ => None,
        }
        .unwrap_or_else(|| "(unknown)".into());
        match err {
            tenants_api::Error::Tls(reason) => Self::Tls { reason },
            tenants_api::Error::InvalidUrl(e) => Self::Validation {
                field: "server".into(),
                reason: e.to_string(),
            },
            tenants_api::Error::InvalidCredentials { message } => Self::Validation {
                field: "credentials".into(),
                reason: message,
            },
            tenants_api::Error::Deserialization { message, .. } => Self::BadResponse { message },
            source @ tenants_api::Error::Transport(_) if source.is_timeout() => {
                Self::Timeout { url, source }
            }
            source @ tenants_api::Error::Transport(_) if source.is_connect() => {
                Self::ConnectionFailed { url, source }
            }
            source @ tenants_api::Error::Transport(_) => Self::RequestFailed { url, source },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::ProfileNotFound { name, available } => Self::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            },
            ConfigError::IncompleteCredentials {
                profile,
                present,
                missing,
            } => Self::IncompleteCredentials {
                profile,
                present: present.into(),
                missing: missing.into(),
            },
            ConfigError::Keyring(e) => Self::Keyring {
                reason: e.to_string(),
            },
            ConfigError::Client(e) => e.into(),
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other),
        }
    }
}
