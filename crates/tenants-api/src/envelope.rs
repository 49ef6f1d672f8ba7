//! Response envelope shared by every tenants endpoint.
//!
//! The server answers each request with either the payload itself or a
//! structured error object, regardless of HTTP status. [`ApiResponse`]
//! makes that an explicit sum type; [`is_api_error`] is the single shape
//! check that decides which variant a decoded body belongs to.

use std::fmt;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::error::Error;

// ── ApiError ─────────────────────────────────────────────────────────

/// Structured application error returned by the server.
///
/// Wire shape: `{"message": "...", "statusCode": 404, "errors": ["..."]}`
/// where only `message` is required. Decoding accepts every body that
/// [`is_api_error`] accepts: `statusCode` may be a number or a numeric
/// string, and `errors` may also be a field map such as
/// `{"Name": ["required"]}`, which is flattened to `"Name: required"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: None,
            errors: Vec::new(),
        }
    }

    /// Error synthesized from a bare HTTP status when the body carried
    /// nothing usable.
    pub fn from_status(status: StatusCode) -> Self {
        Self {
            message: format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown Status")
            ),
            status_code: Some(status.as_u16()),
            errors: Vec::new(),
        }
    }

    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Returns `true` if the server reported a 404.
    pub fn is_not_found(&self) -> bool {
        self.status_code == Some(404)
    }

    /// Returns `true` if the server rejected the credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status_code, Some(401 | 403))
    }

    /// Build an error from any error-shaped body; `None` iff
    /// [`is_api_error`] rejects `value`.
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let message = obj.get("message")?.as_str()?.to_owned();
        Some(Self {
            message,
            status_code: obj.get("statusCode").and_then(status_code_from_value),
            errors: obj.get("errors").map_or_else(Vec::new, error_details),
        })
    }
}

impl<'de> Deserialize<'de> for ApiError {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom("expected an object with a string `message`"))
    }
}

fn status_code_from_value(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn detail_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Flatten the `errors` member into one line per message.
fn error_details(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(detail_text).collect(),
        Value::Object(fields) => fields
            .iter()
            .flat_map(|(field, messages)| match messages {
                Value::Array(items) => items
                    .iter()
                    .map(|m| format!("{field}: {}", detail_text(m)))
                    .collect::<Vec<_>>(),
                other => vec![format!("{field}: {}", detail_text(other))],
            })
            .collect(),
        Value::String(s) => vec![s.clone()],
        _ => Vec::new(),
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "{} (status {code})", self.message)?,
            None => write!(f, "{}", self.message)?,
        }
        for detail in &self.errors {
            write!(f, "; {detail}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Returns `true` iff `value` has the [`ApiError`] shape: a JSON object
/// with a string `message` member.
///
/// None of the payload types served by the tenants API carry a top-level
/// `message` field, so the check is unambiguous for every `T` used here.
pub fn is_api_error(value: &Value) -> bool {
    value
        .as_object()
        .and_then(|obj| obj.get("message"))
        .is_some_and(Value::is_string)
}

// ── ApiResponse ──────────────────────────────────────────────────────

/// Either the decoded payload or a structured server error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Success(T),
    Error(ApiError),
}

/// Envelope for endpoints that return no payload on success.
pub type VoidApiResponse = ApiResponse<()>;

impl<T> ApiResponse<T> {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The payload, dropping any error.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    /// The error, dropping any payload.
    pub fn err(self) -> Option<ApiError> {
        match self {
            Self::Success(_) => None,
            Self::Error(err) => Some(err),
        }
    }

    /// Transform the payload, passing an error through untouched.
    pub fn map<R>(self, f: impl FnOnce(T) -> R) -> ApiResponse<R> {
        match self {
            Self::Success(value) => ApiResponse::Success(f(value)),
            Self::Error(err) => ApiResponse::Error(err),
        }
    }

    /// Convert into a `Result` for `?`-style propagation by the caller.
    pub fn into_result(self) -> Result<T, ApiError> {
        handle_api_response(self, std::convert::identity)
    }
}

impl<T> From<ApiError> for ApiResponse<T> {
    fn from(err: ApiError) -> Self {
        Self::Error(err)
    }
}

/// Normalize an envelope into what the caller wants.
///
/// An error is returned unchanged; a payload is run through `transform`.
/// Use [`ApiResponse::into_result`] when no transformation is needed.
pub fn handle_api_response<T, R>(
    response: ApiResponse<T>,
    transform: impl FnOnce(T) -> R,
) -> Result<R, ApiError> {
    match response {
        ApiResponse::Success(value) => Ok(transform(value)),
        ApiResponse::Error(err) => Err(err),
    }
}

impl<'de, T> Deserialize<'de> for ApiResponse<T>
where
    T: DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match ApiError::from_value(&value) {
            Some(err) => Ok(Self::Error(err)),
            None => serde_json::from_value(value)
                .map(Self::Success)
                .map_err(serde::de::Error::custom),
        }
    }
}

// ── Body decoding ────────────────────────────────────────────────────

/// Classify a raw response body into an envelope.
///
/// The body shape decides, not the status. The status is only consulted
/// to fill in a missing `statusCode` and, for non-2xx replies whose body
/// is neither shape, to synthesize an [`ApiError`]. A 2xx reply that does
/// not decode is a transport failure.
pub fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<ApiResponse<T>, Error> {
    trace!(%status, body_len = body.len(), "decoding response body");

    let reason = match parse_json(body) {
        Some(value) => match error_from_value(&value, status) {
            Some(err) => return Ok(ApiResponse::Error(err)),
            None => match serde_json::from_value::<T>(value) {
                Ok(payload) => return Ok(ApiResponse::Success(payload)),
                Err(e) => e.to_string(),
            },
        },
        None => "body is empty or not JSON".to_owned(),
    };

    fallback(status, body, &reason)
}

/// Classify a response body for endpoints with no success payload.
///
/// Any 2xx reply that is not error-shaped counts as success, whatever
/// it contains.
pub fn decode_void(status: StatusCode, body: &str) -> Result<VoidApiResponse, Error> {
    trace!(%status, body_len = body.len(), "decoding void response body");

    if let Some(err) = parse_json(body).and_then(|value| error_from_value(&value, status)) {
        return Ok(ApiResponse::Error(err));
    }

    if status.is_success() {
        Ok(ApiResponse::Success(()))
    } else {
        Ok(ApiResponse::Error(ApiError::from_status(status)))
    }
}

fn parse_json(body: &str) -> Option<Value> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

/// `Some` for every error-shaped body; a missing or unusable `statusCode`
/// falls back to the HTTP status.
fn error_from_value(value: &Value, status: StatusCode) -> Option<ApiError> {
    let err = ApiError::from_value(value)?;
    Some(match err.status_code {
        Some(_) => err,
        None => err.with_status_code(status.as_u16()),
    })
}

fn fallback<T>(status: StatusCode, body: &str, reason: &str) -> Result<ApiResponse<T>, Error> {
    if status.is_success() {
        let preview: String = body.chars().take(200).collect();
        Err(Error::Deserialization {
            message: format!("{reason} (body preview: {preview:?})"),
            body: body.to_owned(),
        })
    } else {
        Ok(ApiResponse::Error(ApiError::from_status(status)))
    }
}
