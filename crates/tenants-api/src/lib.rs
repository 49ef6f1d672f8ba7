// tenants-api: Async Rust client for the tenants administration API

pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod listing;
pub mod transport;
pub mod types;

pub use auth::Credentials;
pub use client::{DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, TenantQuery, TenantsClient};
pub use envelope::{ApiError, ApiResponse, VoidApiResponse, handle_api_response, is_api_error};
pub use error::Error;
pub use filter::{FilterExpression, StatusFilter, TenantFilter};
pub use listing::{Listing, ListingQuery, load_listing};
pub use transport::{TlsMode, TransportConfig};
pub use types::{
    PaginatedResponse, Tenant, TenantId, TenantInfo, TenantStatus, TenantUpdate,
    map_tenant_status,
};
