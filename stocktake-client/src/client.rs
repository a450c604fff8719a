//! Client facade
//!
//! Wires the session provider, the transport and the resolution context
//! together and hands out the per-resource services. This is the one handle
//! the console holds on to.

use std::sync::Arc;
use std::time::Duration;

use stocktake_api_types::{SignupRequest, SignupResponse};
use stocktake_config::StocktakeConfig;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::errors::ClientResult;
use crate::resolver::AuthContext;
use crate::services::{
    AssetService, AssignmentService, AuditService, AuthService, EmployeeService, RoleService,
    SubscriptionService, TenantService, UserService,
};
use crate::session::{Session, SessionEvent, SessionProvider};
use crate::transport::ApiTransport;

/// Handle over the whole client stack.
pub struct StocktakeClient {
    session: Arc<SessionProvider>,
    transport: ApiTransport,
    context: AuthContext,
    restore_token: Option<String>,
    startup_timeout: Duration,
}

impl StocktakeClient {
    /// Build the full client stack from configuration.
    pub fn new(config: &StocktakeConfig) -> ClientResult<Self> {
        let session = Arc::new(SessionProvider::new(&config.auth, &config.api.user_agent)?);
        let transport = ApiTransport::new(&config.api, session.clone())?;
        let context = AuthContext::new(
            transport.clone(),
            session.clone(),
            config.auth.resolve_timeout,
        );
        Ok(Self {
            session,
            transport,
            context,
            restore_token: config.auth.refresh_token.clone(),
            startup_timeout: config.auth.startup_timeout,
        })
    }

    /// Restore a session from the configured refresh token, bounded by the
    /// startup timeout. Returns whether a session was established; failure
    /// or timeout leaves the client signed out and is not an error.
    pub async fn startup(&self) -> bool {
        let Some(refresh_token) = self.restore_token.as_deref() else {
            debug!("no refresh token configured, starting signed out");
            return false;
        };
        match tokio::time::timeout(self.startup_timeout, self.session.refresh(refresh_token)).await
        {
            Ok(Ok(_)) => {
                self.context.resolve().await;
                true
            }
            Ok(Err(error)) => {
                warn!(%error, "session restore failed");
                false
            }
            Err(_) => {
                warn!(timeout = ?self.startup_timeout, "session restore timed out");
                false
            }
        }
    }

    /// Sign in and resolve the caller's profile and tenant.
    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<Session> {
        let session = self.session.sign_in(email, password).await?;
        self.context.resolve().await;
        Ok(session)
    }

    /// Provision a tenant, then sign its admin in.
    pub async fn sign_up(&self, request: &SignupRequest) -> ClientResult<SignupResponse> {
        let response = self.auth().signup(request).await?;
        self.session.sign_in(&request.email, &request.password).await?;
        self.context.resolve().await;
        Ok(response)
    }

    /// Sign out and drop all resolved state.
    pub async fn sign_out(&self) {
        self.session.sign_out().await;
        self.context.clear().await;
    }

    pub async fn reset_password(&self, email: &str) -> ClientResult<()> {
        self.session.reset_password(email).await
    }

    pub fn session(&self) -> &SessionProvider {
        &self.session
    }

    pub fn context(&self) -> &AuthContext {
        &self.context
    }

    /// Session lifecycle events (sign-in, sign-out, forced teardown).
    pub fn subscribe(&self) -> watch::Receiver<SessionEvent> {
        self.session.subscribe()
    }

    pub fn assets(&self) -> AssetService<'_> {
        AssetService::new(&self.transport)
    }

    pub fn employees(&self) -> EmployeeService<'_> {
        EmployeeService::new(&self.transport)
    }

    pub fn assignments(&self) -> AssignmentService<'_> {
        AssignmentService::new(&self.transport)
    }

    pub fn users(&self) -> UserService<'_> {
        UserService::new(&self.transport)
    }

    pub fn roles(&self) -> RoleService<'_> {
        RoleService::new(&self.transport)
    }

    pub fn tenants(&self) -> TenantService<'_> {
        TenantService::new(&self.transport)
    }

    pub fn subscriptions(&self) -> SubscriptionService<'_> {
        SubscriptionService::new(&self.transport)
    }

    pub fn audit(&self) -> AuditService<'_> {
        AuditService::new(&self.transport)
    }

    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&self.transport)
    }
}
