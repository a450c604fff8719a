//! Post-sign-in identity resolution
//!
//! Once a session exists, the caller's application profile (`/api/auth/me`)
//! and tenant (`/api/tenants/current/info`) are resolved with bounded waits.
//! Both resolutions degrade instead of failing: a missing profile leaves the
//! role pending (least privilege) and a missing tenant leaves the
//! organization placeholder. Resolved state is stamped with the session
//! generation it was fetched under, so state belonging to a torn-down
//! session is never served.

use std::sync::Arc;
use std::time::Duration;

use stocktake_api_types::{Action, Resource, Role, Tenant, UserInfo};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::gate;
use crate::session::{SessionProvider, TokenSource};
use crate::transport::ApiTransport;

/// Outcome of role resolution for the signed-in caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleResolution {
    /// No usable role signal yet; privileged affordances stay hidden.
    Pending,
    /// Role taken from the application profile or the identity claim.
    Resolved(Role),
}

impl RoleResolution {
    /// Role the permission gate is consulted with.
    pub fn effective(self) -> Role {
        match self {
            RoleResolution::Resolved(role) => role,
            RoleResolution::Pending => Role::Viewer,
        }
    }

    pub fn is_pending(self) -> bool {
        matches!(self, RoleResolution::Pending)
    }
}

/// Resolved caller state served to the console.
#[derive(Debug, Clone)]
pub struct ContextSnapshot {
    pub user: Option<UserInfo>,
    pub tenant: Option<Tenant>,
    pub role: RoleResolution,
}

impl ContextSnapshot {
    fn signed_out() -> Self {
        Self {
            user: None,
            tenant: None,
            role: RoleResolution::Pending,
        }
    }
}

struct Resolved {
    generation: u64,
    snapshot: ContextSnapshot,
}

/// Holds user and tenant state for the current session generation.
pub struct AuthContext {
    transport: ApiTransport,
    provider: Arc<SessionProvider>,
    resolve_timeout: Duration,
    state: RwLock<Resolved>,
}

impl AuthContext {
    pub fn new(
        transport: ApiTransport,
        provider: Arc<SessionProvider>,
        resolve_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            provider,
            resolve_timeout,
            state: RwLock::new(Resolved {
                generation: 0,
                snapshot: ContextSnapshot::signed_out(),
            }),
        }
    }

    /// Resolve the profile and tenant for the current session, each bounded
    /// by the configured wait. No-op when signed out.
    pub async fn resolve(&self) {
        let generation = self.provider.generation().await;
        let Some(session) = self.provider.current_session().await else {
            self.clear().await;
            return;
        };

        let user = match tokio::time::timeout(
            self.resolve_timeout,
            self.transport.get::<UserInfo>("/api/auth/me"),
        )
        .await
        {
            Ok(Ok(user)) => Some(user),
            Ok(Err(error)) => {
                warn!(%error, "user info resolution failed");
                None
            }
            Err(_) => {
                warn!(timeout = ?self.resolve_timeout, "user info resolution timed out");
                None
            }
        };

        let tenant = match tokio::time::timeout(
            self.resolve_timeout,
            self.transport.get::<Tenant>("/api/tenants/current/info"),
        )
        .await
        {
            Ok(Ok(tenant)) => Some(tenant),
            Ok(Err(error)) => {
                debug!(%error, "tenant resolution failed");
                None
            }
            Err(_) => {
                debug!(timeout = ?self.resolve_timeout, "tenant resolution timed out");
                None
            }
        };

        // Profile role first, then the identity metadata claim. Anything
        // else stays pending; there is no privileged fallback.
        let role = user
            .as_ref()
            .and_then(|user| user.role)
            .or_else(|| session.user.metadata_role())
            .map_or(RoleResolution::Pending, RoleResolution::Resolved);

        let mut state = self.state.write().await;
        if self.provider.generation().await != generation {
            debug!("session changed during resolution, result discarded");
            return;
        }
        *state = Resolved {
            generation,
            snapshot: ContextSnapshot { user, tenant, role },
        };
    }

    /// Caller state for the current session. Resolutions from a previous
    /// generation read as signed-out/pending.
    pub async fn snapshot(&self) -> ContextSnapshot {
        let state = self.state.read().await;
        if self.provider.generation().await == state.generation
            && self.provider.is_signed_in().await
        {
            return state.snapshot.clone();
        }
        ContextSnapshot::signed_out()
    }

    /// Role used for affordance gating.
    pub async fn effective_role(&self) -> Role {
        self.snapshot().await.role.effective()
    }

    /// Advisory permission check with the effective role.
    pub async fn allows(&self, resource: Resource, action: Action) -> bool {
        gate::allows(self.effective_role().await, resource, action)
    }

    /// Drop resolved state (on sign-out).
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        *state = Resolved {
            generation: self.provider.generation().await,
            snapshot: ContextSnapshot::signed_out(),
        };
    }
}
