//! Tenant endpoints
//!
//! The tenant is always derived from the bearer token; the client never
//! passes a tenant id to scope reads.

use stocktake_api_types::{Tenant, TenantId, UpdateTenant};

use crate::errors::ClientResult;
use crate::transport::ApiTransport;

pub struct TenantService<'a> {
    transport: &'a ApiTransport,
}

impl<'a> TenantService<'a> {
    pub(crate) fn new(transport: &'a ApiTransport) -> Self {
        Self { transport }
    }

    /// The caller's organization, including its subscription summary.
    pub async fn current(&self) -> ClientResult<Tenant> {
        self.transport.get("/api/tenants/current/info").await
    }

    pub async fn update(&self, id: TenantId, request: &UpdateTenant) -> ClientResult<Tenant> {
        self.transport.put(&format!("/api/tenants/{id}"), request).await
    }
}
