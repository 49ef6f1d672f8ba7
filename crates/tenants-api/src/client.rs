// Async HTTP client for the tenants resource.
//
// Base path: {base_url}/tenants
// Auth: `Authorization: Bearer <token>` + `RefreshToken: <refresh>` headers
//
// Every HTTP status is accepted. The body is decoded into an `ApiResponse`
// and returned verbatim; only failures that prevent classification surface
// as `Err`.

use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::Credentials;
use crate::envelope::{self, ApiResponse, VoidApiResponse};
use crate::error::Error;
use crate::filter::TenantFilter;
use crate::transport::TransportConfig;
use crate::types::{NewTenant, PaginatedResponse, Tenant, TenantId, TenantInfo, TenantUpdate};

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5105/api";

/// Default page size for tenant listings.
pub const DEFAULT_PAGE_SIZE: u32 = 5;

// ── Query ────────────────────────────────────────────────────────────

/// Parameters for `GET /tenants`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantQuery {
    /// 1-based page number. Not validated here.
    pub page_number: i64,
    pub page_size: u32,
    pub filter: TenantFilter,
}

impl Default for TenantQuery {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
            filter: TenantFilter::default(),
        }
    }
}

impl TenantQuery {
    pub fn new(page_number: i64, page_size: u32, filter: TenantFilter) -> Self {
        Self {
            page_number,
            page_size,
            filter,
        }
    }

    fn params(&self) -> [(&'static str, String); 3] {
        [
            ("pageNumber", self.page_number.to_string()),
            ("pageSize", self.page_size.to_string()),
            ("filterTerm", self.filter.to_expression().to_string()),
        ]
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the tenants API.
///
/// Cheap to clone. Credentials are part of the value: [`with_auth`](Self::with_auth)
/// hands back a new client, so clones used by different sessions never
/// observe each other's tokens.
#[derive(Debug, Clone)]
pub struct TenantsClient {
    http: reqwest::Client,
    base_url: Url,
    auth_headers: HeaderMap,
}

impl TenantsClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            auth_headers: HeaderMap::new(),
        })
    }

    /// Return a client that sends `credentials` on every request.
    pub fn with_auth(mut self, credentials: &Credentials) -> Result<Self, Error> {
        self.auth_headers = credentials.headers()?;
        debug!("credentials attached to tenants client");
        Ok(self)
    }

    /// Ensure the base path ends with `/` so relative joins append.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The normalized base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn has_auth(&self) -> bool {
        !self.auth_headers.is_empty()
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .headers(self.auth_headers.clone())
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<ApiResponse<T>, Error> {
        let url = self.url(segments)?;
        debug!("GET {url}");

        let resp = self.request(reqwest::Method::GET, url).send().await?;
        Self::handle_response(resp).await
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<ApiResponse<T>, Error> {
        let url = self.url(segments)?;
        debug!("GET {url} params={params:?}");

        let resp = self
            .request(reqwest::Method::GET, url)
            .query(params)
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<ApiResponse<T>, Error> {
        let url = self.url(segments)?;
        debug!("POST {url}");

        let resp = self
            .request(reqwest::Method::POST, url)
            .json(body)
            .send()
            .await?;
        Self::handle_response(resp).await
    }

    async fn put_no_response<B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<VoidApiResponse, Error> {
        let url = self.url(segments)?;
        debug!("PUT {url}");

        let resp = self
            .request(reqwest::Method::PUT, url)
            .json(body)
            .send()
            .await?;
        Self::handle_empty(resp).await
    }

    async fn delete(&self, segments: &[&str]) -> Result<VoidApiResponse, Error> {
        let url = self.url(segments)?;
        debug!("DELETE {url}");

        let resp = self.request(reqwest::Method::DELETE, url).send().await?;
        Self::handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<ApiResponse<T>, Error> {
        let status = resp.status();
        let body = resp.text().await?;
        let envelope = envelope::decode(status, &body)?;
        if envelope.is_error() {
            debug!(%status, "server returned an error envelope");
        }
        Ok(envelope)
    }

    async fn handle_empty(resp: reqwest::Response) -> Result<VoidApiResponse, Error> {
        let status = resp.status();
        let body = resp.text().await?;
        let envelope = envelope::decode_void(status, &body)?;
        if envelope.is_error() {
            debug!(%status, "server returned an error envelope");
        }
        Ok(envelope)
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// `POST /tenants` with `{name}`. Returns the server-assigned id.
    ///
    /// The name is not validated locally; the server decides.
    pub async fn create_tenant(&self, name: &str) -> Result<ApiResponse<i64>, Error> {
        self.post(&["tenants"], &NewTenant { name }).await
    }

    /// `GET /tenants?pageNumber&pageSize&filterTerm`
    pub async fn get_tenants(
        &self,
        query: &TenantQuery,
    ) -> Result<ApiResponse<PaginatedResponse<Tenant>>, Error> {
        self.get_with_params(&["tenants"], &query.params()).await
    }

    /// `GET /tenants/{id}`
    pub async fn get_tenant_by_id(&self, id: &TenantId) -> Result<ApiResponse<Tenant>, Error> {
        self.get(&["tenants", id.as_str()]).await
    }

    /// `PUT /tenants/{id}` with only the fields set in `update`.
    pub async fn update_tenant(
        &self,
        id: &TenantId,
        update: &TenantUpdate,
    ) -> Result<VoidApiResponse, Error> {
        self.put_no_response(&["tenants", id.as_str()], update)
            .await
    }

    /// `DELETE /tenants/{id}`
    pub async fn delete_tenant(&self, id: &TenantId) -> Result<VoidApiResponse, Error> {
        self.delete(&["tenants", id.as_str()]).await
    }

    /// `GET /tenants/info`
    pub async fn get_tenants_info(&self) -> Result<ApiResponse<TenantInfo>, Error> {
        self.get(&["tenants", "info"]).await
    }
}
