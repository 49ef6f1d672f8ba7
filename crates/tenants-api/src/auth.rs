use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Header carrying the refresh token alongside the bearer token.
pub const REFRESH_TOKEN_HEADER: &str = "RefreshToken";

/// Bearer + refresh token pair for one logical session.
///
/// Immutable once built. A client picks it up through
/// [`TenantsClient::with_auth`](crate::TenantsClient::with_auth), which
/// returns a new client value instead of mutating shared headers.
#[derive(Debug, Clone)]
pub struct Credentials {
    token: SecretString,
    refresh_token: SecretString,
}

impl Credentials {
    /// Build a credential pair. Both tokens must be non-empty.
    pub fn new(
        token: impl Into<SecretString>,
        refresh_token: impl Into<SecretString>,
    ) -> Result<Self, Error> {
        let token = token.into();
        let refresh_token = refresh_token.into();

        if token.expose_secret().is_empty() {
            return Err(Error::InvalidCredentials {
                message: "token must not be empty".into(),
            });
        }
        if refresh_token.expose_secret().is_empty() {
            return Err(Error::InvalidCredentials {
                message: "refresh token must not be empty".into(),
            });
        }

        Ok(Self {
            token,
            refresh_token,
        })
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }

    pub fn refresh_token(&self) -> &SecretString {
        &self.refresh_token
    }

    /// Render the `Authorization` and `RefreshToken` headers.
    ///
    /// Both values are flagged sensitive so they never show up in
    /// reqwest's debug output.
    pub(crate) fn headers(&self) -> Result<HeaderMap, Error> {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", self.token.expose_secret()))
            .map_err(|e| Error::InvalidCredentials {
                message: format!("invalid token header value: {e}"),
            })?;
        bearer.set_sensitive(true);

        let mut refresh =
            HeaderValue::from_str(self.refresh_token.expose_secret()).map_err(|e| {
                Error::InvalidCredentials {
                    message: format!("invalid refresh token header value: {e}"),
                }
            })?;
        refresh.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(HeaderName::from_static("refreshtoken"), refresh);
        Ok(headers)
    }
}
