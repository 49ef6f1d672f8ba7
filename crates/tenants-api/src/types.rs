//! Tenant resource types.
//!
//! Field names use camelCase on the wire via `#[serde(rename_all = "camelCase")]`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{EnumIter, EnumString, IntoStaticStr};

// ── TenantId ─────────────────────────────────────────────────────────

/// Tenant identifier.
///
/// The server assigns numeric ids but clients treat them as opaque
/// strings, so decoding accepts either a JSON number or a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TenantId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<i64> for TenantId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for TenantId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Number(n) => Self::from(n),
        })
    }
}

// ── TenantStatus ─────────────────────────────────────────────────────

/// Lifecycle status of a tenant. Sent as a small integer on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, EnumString, EnumIter, IntoStaticStr,
)]
pub enum TenantStatus {
    Active,
    Inactive,
    Demo,
}

/// Label used for status codes outside the known set.
pub const UNKNOWN_STATUS_LABEL: &str = "Unknown";

impl TenantStatus {
    /// Wire code for this status.
    pub fn code(self) -> i64 {
        match self {
            Self::Active => 0,
            Self::Inactive => 1,
            Self::Demo => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Active),
            1 => Some(Self::Inactive),
            2 => Some(Self::Demo),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        self.into()
    }
}

/// Human label for a wire status code; `"Unknown"` for anything unmapped.
pub fn map_tenant_status(code: i64) -> &'static str {
    TenantStatus::from_code(code).map_or(UNKNOWN_STATUS_LABEL, TenantStatus::label)
}

impl Serialize for TenantStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for TenantStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i64::deserialize(deserializer)?;
        Self::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown tenant status code {code}")))
    }
}

// ── Tenant ───────────────────────────────────────────────────────────

/// A tenant as returned by `GET /tenants` and `GET /tenants/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    /// Raw wire code. Kept unparsed so unknown codes still decode.
    pub status: i64,
}

impl Tenant {
    /// Parsed status, `None` for codes this client does not know.
    pub fn status(&self) -> Option<TenantStatus> {
        TenantStatus::from_code(self.status)
    }

    pub fn status_label(&self) -> &'static str {
        map_tenant_status(self.status)
    }
}

/// Aggregate counts from `GET /tenants/info`. Recomputed by the server on
/// every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantInfo {
    pub active: u64,
    pub inactive: u64,
    pub demo: u64,
    pub total: u64,
}

// ── Pagination ───────────────────────────────────────────────────────

/// Page of results returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub page_number: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_count: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of pages at the current page size.
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(u64::from(self.page_size))
    }

    pub fn has_next_page(&self) -> bool {
        u64::from(self.page_number) < self.total_pages()
    }
}

// ── Request bodies ───────────────────────────────────────────────────

/// Body for `POST /tenants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct NewTenant<'a> {
    pub name: &'a str,
}

/// Partial update for `PUT /tenants/{id}`. Only the fields that are set
/// are serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TenantStatus>,
}

impl TenantUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn status(mut self, status: TenantStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.status.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn maps_known_status_codes() {
        for status in TenantStatus::iter() {
            assert_eq!(map_tenant_status(status.code()), status.to_string());
        }
        assert_eq!(map_tenant_status(0), "Active");
        assert_eq!(map_tenant_status(1), "Inactive");
        assert_eq!(map_tenant_status(2), "Demo");
    }

    #[test]
    fn maps_unknown_status_codes() {
        for code in [-1, 3, 42, i64::MAX, i64::MIN] {
            assert_eq!(map_tenant_status(code), "Unknown");
        }
    }

    #[test]
    fn parses_status_labels() {
        assert_eq!("Active".parse::<TenantStatus>().unwrap(), TenantStatus::Active);
        assert_eq!("Demo".parse::<TenantStatus>().unwrap(), TenantStatus::Demo);
        assert!("active".parse::<TenantStatus>().is_err());
        assert!("all".parse::<TenantStatus>().is_err());
    }

    #[test]
    fn tenant_accepts_numeric_and_string_ids() {
        let a: Tenant =
            serde_json::from_value(json!({ "id": 5, "name": "acme", "status": 0 })).unwrap();
        let b: Tenant =
            serde_json::from_value(json!({ "id": "5", "name": "acme", "status": 0 })).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.id.as_str(), "5");
    }

    #[test]
    fn tenant_with_unknown_status_still_decodes() {
        let t: Tenant =
            serde_json::from_value(json!({ "id": 1, "name": "x", "status": 9 })).unwrap();
        assert_eq!(t.status(), None);
        assert_eq!(t.status_label(), "Unknown");
    }

    #[test]
    fn update_serializes_only_present_fields() {
        let body = serde_json::to_value(TenantUpdate::new().status(TenantStatus::Demo)).unwrap();
        assert_eq!(body, json!({ "status": 2 }));

        let body = serde_json::to_value(TenantUpdate::new().name("acme")).unwrap();
        assert_eq!(body, json!({ "name": "acme" }));

        assert!(TenantUpdate::new().is_empty());
    }

    #[test]
    fn pagination_helpers() {
        let page: PaginatedResponse<Tenant> = serde_json::from_value(json!({
            "items": [], "pageNumber": 2, "pageSize": 5, "totalCount": 11
        }))
        .unwrap();
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next_page());
        assert!(page.is_empty());
    }

    #[test]
    fn pagination_metadata_defaults_to_zero() {
        let page: PaginatedResponse<Tenant> =
            serde_json::from_value(json!({ "items": [] })).unwrap();
        assert_eq!(page.total_pages(), 0);
        assert!(!page.has_next_page());
    }
}
