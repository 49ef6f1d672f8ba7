use thiserror::Error;

/// Transport-level error type for the `tenants-api` crate.
///
/// Application failures reported by the server never land here: they are
/// decoded into [`ApiResponse::Error`](crate::ApiResponse::Error) and handed
/// back as data. This enum covers everything that prevents a response body
/// from being classified at all.
#[derive(Debug, Error)]
pub enum Error {
    // ── Credentials ─────────────────────────────────────────────────
    /// Token material that cannot be sent (empty, or not a valid header value).
    #[error("Invalid credentials: {message}")]
    InvalidCredentials { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// A successful response whose body matched neither the payload nor
    /// the error shape. Carries the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the request never reached the server.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect())
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}
