//! Paginated tenant listing for admin pages.
//!
//! Turns raw query-string parameters (`page`, `status`, `name`) into the
//! list call plus the aggregate-info call, and tells the caller whether
//! to render, redirect, or show the empty-page notice.

use serde::Serialize;
use tracing::{debug, info};

use crate::client::{DEFAULT_PAGE_SIZE, TenantQuery, TenantsClient};
use crate::envelope::ApiResponse;
use crate::error::Error;
use crate::filter::{ALL_STATUSES, TenantFilter};
use crate::types::{PaginatedResponse, Tenant, TenantInfo};

/// Location of the first listing page.
pub const FIRST_PAGE_LOCATION: &str = "/tenants?page=1";

/// Notice shown when the requested page has no rows.
pub const EMPTY_PAGE_MESSAGE: &str = "No tenants found. Redirected to the first page.";

/// Listing parameters as read from the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub page: i64,
    pub status: String,
    pub name: String,
    /// Not read from the query string.
    pub page_size: u32,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            page: 1,
            status: ALL_STATUSES.to_owned(),
            name: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListingQuery {
    /// Read `page`, `status` and `name` from decoded query pairs.
    ///
    /// Missing or empty values fall back to the defaults. `page` is read
    /// from its leading integer, so `2abc` is page 2 and `3.9` is page 3;
    /// a value with no leading digits is page 1.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "page" => query.page = leading_integer(value).unwrap_or(1),
                "status" => value.clone_into(&mut query.status),
                "name" => value.clone_into(&mut query.name),
                _ => {}
            }
        }
        query
    }

    /// Parse a raw query string such as `page=2&status=Active&name=ac%20me`.
    pub fn from_query_string(query: &str) -> Self {
        Self::from_pairs(url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()))
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    fn to_tenant_query(&self) -> TenantQuery {
        TenantQuery::new(
            self.page,
            self.page_size,
            TenantFilter::from_labels(&self.status, self.name.as_str()),
        )
    }
}

/// The optionally signed run of digits at the start of `value`.
fn leading_integer(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let sign_len = usize::from(value.starts_with(['+', '-']));
    let digits = value[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len() - sign_len);
    if digits == 0 {
        return None;
    }
    value[..sign_len + digits].parse().ok()
}

/// Outcome of loading a listing page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Listing {
    /// The page number was out of range; go to `location` instead.
    Redirect { location: String },
    /// The list call succeeded but matched nothing on this page.
    Empty { message: String, redirect_page: i64 },
    /// Both envelopes, exactly as the server returned them.
    Loaded {
        tenants: ApiResponse<PaginatedResponse<Tenant>>,
        info: ApiResponse<TenantInfo>,
    },
}

/// Load one listing page.
///
/// Issues the list call, then the info call. The info call is skipped
/// only when the list call succeeded with zero items; a list error still
/// gets its info call so the page can render the counts.
pub async fn load_listing(client: &TenantsClient, query: &ListingQuery) -> Result<Listing, Error> {
    if query.page < 1 {
        debug!(page = query.page, "page out of range, redirecting");
        return Ok(Listing::Redirect {
            location: FIRST_PAGE_LOCATION.to_owned(),
        });
    }

    let tenants = client.get_tenants(&query.to_tenant_query()).await?;

    if let ApiResponse::Success(page) = &tenants {
        if page.items.is_empty() {
            info!(page = query.page, "no tenants on requested page");
            return Ok(Listing::Empty {
                message: EMPTY_PAGE_MESSAGE.to_owned(),
                redirect_page: 1,
            });
        }
    }

    let info = client.get_tenants_info().await?;

    Ok(Listing::Loaded { tenants, info })
}
