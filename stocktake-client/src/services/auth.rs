//! Backend auth endpoints
//!
//! These live on the inventory API, not the identity provider: the profile
//! lookup behind role resolution and the tenant-provisioning signup.

use stocktake_api_types::{SignupRequest, SignupResponse, UserInfo};

use crate::errors::ClientResult;
use crate::transport::ApiTransport;

pub struct AuthService<'a> {
    transport: &'a ApiTransport,
}

impl<'a> AuthService<'a> {
    pub(crate) fn new(transport: &'a ApiTransport) -> Self {
        Self { transport }
    }

    /// The caller's application profile.
    pub async fn me(&self) -> ClientResult<UserInfo> {
        self.transport.get("/api/auth/me").await
    }

    /// Provision a tenant with its first admin user, seeded system roles and
    /// a trial subscription. Runs unauthenticated.
    pub async fn signup(&self, request: &SignupRequest) -> ClientResult<SignupResponse> {
        self.transport.post("/api/auth/signup", request).await
    }
}
