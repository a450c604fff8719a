//! Identity provider session management
//!
//! Wraps the GoTrue-compatible auth endpoints: password grant, refresh
//! grant, logout and password recovery. The provider owns the session slot
//! and stamps every lifecycle transition with a monotonically increasing
//! generation; the transport uses that stamp to tear a rejected session
//! down exactly once even under concurrent requests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use stocktake_api_types::Role;
use stocktake_config::AuthConfig;
use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};

use crate::errors::{ClientError, ClientResult};

/// Identity calls share one generous client timeout; the startup restore is
/// additionally bounded by `auth.startup_timeout` at the call site.
const IDENTITY_TIMEOUT: Duration = Duration::from_secs(30);

/// Identity user embedded in the token response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl IdentityUser {
    /// Role claim from `user_metadata.role`, when present and recognized.
    pub fn metadata_role(&self) -> Option<Role> {
        self.user_metadata
            .get("role")
            .and_then(|value| value.as_str())
            .and_then(|role| role.parse().ok())
    }
}

/// An established session as returned by the token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub refresh_token: String,
    pub user: IdentityUser,
}

/// Session lifecycle notification published on the watch channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// No session is established. `forced` marks a teardown triggered by a
    /// token the backend rejected, as opposed to an explicit sign-out.
    SignedOut { forced: bool },
    /// A session was established or replaced.
    SignedIn { generation: u64 },
}

/// Where the transport obtains bearer tokens and reports rejected ones.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Current bearer token, if any.
    async fn bearer_token(&self) -> Option<String>;

    /// Stamp identifying the current session lifecycle state.
    async fn generation(&self) -> u64;

    /// Tear the session down if `generation` is still current. Returns true
    /// when this call performed the teardown.
    async fn invalidate(&self, generation: u64) -> bool;
}

struct Slot {
    session: Option<Session>,
    generation: u64,
}

/// Client for the identity provider, holding the current session.
pub struct SessionProvider {
    http: reqwest::Client,
    base: String,
    anon_key: Option<String>,
    slot: RwLock<Slot>,
    events: watch::Sender<SessionEvent>,
}

impl SessionProvider {
    /// Build a provider from the auth domain configuration.
    pub fn new(config: &AuthConfig, user_agent: &str) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(IDENTITY_TIMEOUT)
            .user_agent(user_agent)
            .build()?;
        let base = Url::parse(&config.url)?;
        let (events, _) = watch::channel(SessionEvent::SignedOut { forced: false });
        Ok(Self {
            http,
            base: base.as_str().trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            slot: RwLock::new(Slot {
                session: None,
                generation: 0,
            }),
            events,
        })
    }

    /// Exchange credentials for a session (password grant).
    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<Session> {
        debug!(%email, "signing in");
        let body = serde_json::json!({ "email": email, "password": password });
        let session = self.token_request("password", &body).await?;
        self.install(session.clone()).await;
        Ok(session)
    }

    /// Exchange a refresh token for a fresh session (refresh grant).
    pub async fn refresh(&self, refresh_token: &str) -> ClientResult<Session> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        let session = self.token_request("refresh_token", &body).await?;
        self.install(session.clone()).await;
        Ok(session)
    }

    /// End the session. The identity logout is best-effort: local state is
    /// cleared even when the call fails.
    pub async fn sign_out(&self) {
        if let Some(token) = self.current_token().await {
            let request = self
                .identity_request(&format!("{}/logout", self.base))
                .bearer_auth(token);
            match request.send().await {
                Ok(response) if !response.status().is_success() => {
                    warn!(status = %response.status(), "identity logout rejected");
                }
                Err(error) => warn!(%error, "identity logout failed"),
                _ => {}
            }
        }
        let mut slot = self.slot.write().await;
        if slot.session.take().is_some() {
            slot.generation += 1;
        }
        drop(slot);
        self.events.send_replace(SessionEvent::SignedOut { forced: false });
    }

    /// Ask the identity provider to send a recovery email.
    pub async fn reset_password(&self, email: &str) -> ClientResult<()> {
        let body = serde_json::json!({ "email": email });
        let response = self
            .identity_request(&format!("{}/recover", self.base))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let bytes = response.bytes().await.unwrap_or_default();
            return Err(ClientError::Auth(identity_error(status, &bytes)));
        }
        Ok(())
    }

    /// Current session snapshot.
    pub async fn current_session(&self) -> Option<Session> {
        self.slot.read().await.session.clone()
    }

    /// True when a session is established.
    pub async fn is_signed_in(&self) -> bool {
        self.slot.read().await.session.is_some()
    }

    /// Subscribe to session lifecycle events. The receiver always observes
    /// the most recent transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    async fn current_token(&self) -> Option<String> {
        self.slot
            .read()
            .await
            .session
            .as_ref()
            .map(|session| session.access_token.clone())
    }

    fn identity_request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.http.post(url);
        match &self.anon_key {
            Some(key) => request.header("apikey", key),
            None => request,
        }
    }

    async fn token_request(&self, grant_type: &str, body: &serde_json::Value) -> ClientResult<Session> {
        let url = format!("{}/token?grant_type={grant_type}", self.base);
        let response = self.identity_request(&url).json(body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(ClientError::Auth(identity_error(status, &bytes)));
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn install(&self, session: Session) {
        let generation = {
            let mut slot = self.slot.write().await;
            slot.session = Some(session);
            slot.generation += 1;
            slot.generation
        };
        debug!(generation, "session established");
        self.events.send_replace(SessionEvent::SignedIn { generation });
    }
}

#[async_trait]
impl TokenSource for SessionProvider {
    async fn bearer_token(&self) -> Option<String> {
        self.current_token().await
    }

    async fn generation(&self) -> u64 {
        self.slot.read().await.generation
    }

    async fn invalidate(&self, generation: u64) -> bool {
        let mut slot = self.slot.write().await;
        if slot.generation != generation || slot.session.is_none() {
            return false;
        }
        slot.session = None;
        slot.generation += 1;
        drop(slot);
        warn!("session invalidated after a rejected token");
        self.events.send_replace(SessionEvent::SignedOut { forced: true });
        true
    }
}

/// Extract the human message from a GoTrue-style error body.
fn identity_error(status: StatusCode, body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct Raw {
        #[serde(default)]
        error_description: Option<String>,
        #[serde(default)]
        msg: Option<String>,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        error: Option<String>,
    }
    serde_json::from_slice::<Raw>(body)
        .ok()
        .and_then(|raw| raw.error_description.or(raw.msg).or(raw.message).or(raw.error))
        .unwrap_or_else(|| format!("identity request failed with status {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn token_body(access: &str) -> serde_json::Value {
        serde_json::json!({
            "access_token": access,
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh-1",
            "user": {
                "id": "7a1e2f9c-1111-4222-8333-944445555666",
                "email": "pat@example.com",
                "user_metadata": { "role": "manager" }
            }
        })
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn provider(base: String) -> SessionProvider {
        let config = AuthConfig {
            url: base,
            anon_key: Some("anon-key".to_string()),
            ..Default::default()
        };
        SessionProvider::new(&config, "stocktake-tests").unwrap()
    }

    #[tokio::test]
    async fn password_grant_installs_session_and_publishes_event() {
        let router = Router::new().route(
            "/token",
            post(
                |Query(params): Query<HashMap<String, String>>, headers: HeaderMap| async move {
                    assert_eq!(params.get("grant_type").map(String::as_str), Some("password"));
                    assert_eq!(headers.get("apikey").unwrap(), "anon-key");
                    Json(token_body("token-1"))
                },
            ),
        );
        let provider = provider(serve(router).await);
        let mut events = provider.subscribe();

        let session = provider.sign_in("pat@example.com", "hunter2").await.unwrap();

        assert_eq!(session.access_token, "token-1");
        assert_eq!(session.user.metadata_role(), Some(Role::Manager));
        assert!(provider.is_signed_in().await);
        assert_eq!(provider.generation().await, 1);
        events.changed().await.unwrap();
        assert_eq!(*events.borrow(), SessionEvent::SignedIn { generation: 1 });
    }

    #[tokio::test]
    async fn rejected_credentials_surface_the_provider_message() {
        let router = Router::new().route(
            "/token",
            post(|| async {
                (
                    axum::http::StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                        "error": "invalid_grant",
                        "error_description": "Invalid login credentials"
                    })),
                )
            }),
        );
        let provider = provider(serve(router).await);

        let error = provider.sign_in("pat@example.com", "wrong").await.unwrap_err();

        match error {
            ClientError::Auth(message) => assert_eq!(message, "Invalid login credentials"),
            other => panic!("expected Auth error, got {other:?}"),
        }
        assert!(!provider.is_signed_in().await);
    }

    #[tokio::test]
    async fn refresh_grant_restores_a_session() {
        let router = Router::new().route(
            "/token",
            post(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(
                    params.get("grant_type").map(String::as_str),
                    Some("refresh_token")
                );
                Json(token_body("token-2"))
            }),
        );
        let provider = provider(serve(router).await);

        let session = provider.refresh("refresh-0").await.unwrap();

        assert_eq!(session.access_token, "token-2");
        assert!(provider.is_signed_in().await);
    }

    #[tokio::test]
    async fn sign_out_clears_state_even_when_logout_fails() {
        let router = Router::new()
            .route("/token", post(|| async { Json(token_body("token-3")) }))
            .route(
                "/logout",
                post(|| async { axum::http::StatusCode::INTERNAL_SERVER_ERROR }),
            );
        let provider = provider(serve(router).await);
        provider.sign_in("pat@example.com", "hunter2").await.unwrap();

        provider.sign_out().await;

        assert!(!provider.is_signed_in().await);
        assert_eq!(provider.generation().await, 2);
        assert_eq!(
            *provider.subscribe().borrow(),
            SessionEvent::SignedOut { forced: false }
        );
    }

    #[tokio::test]
    async fn invalidate_tears_down_once_per_generation() {
        let router = Router::new().route("/token", post(|| async { Json(token_body("token-4")) }));
        let provider = Arc::new(provider(serve(router).await));
        provider.sign_in("pat@example.com", "hunter2").await.unwrap();
        let generation = provider.generation().await;

        let teardowns = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let provider = provider.clone();
            let teardowns = teardowns.clone();
            handles.push(tokio::spawn(async move {
                if provider.invalidate(generation).await {
                    teardowns.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(teardowns.load(Ordering::SeqCst), 1);
        assert!(!provider.is_signed_in().await);
        assert_eq!(
            *provider.subscribe().borrow(),
            SessionEvent::SignedOut { forced: true }
        );
    }

    #[tokio::test]
    async fn stale_generation_does_not_touch_a_newer_session() {
        let router = Router::new().route("/token", post(|| async { Json(token_body("token-5")) }));
        let provider = provider(serve(router).await);
        provider.sign_in("pat@example.com", "hunter2").await.unwrap();
        let old_generation = provider.generation().await;

        // Session replaced; the old generation is history.
        provider.sign_in("pat@example.com", "hunter2").await.unwrap();

        assert!(!provider.invalidate(old_generation).await);
        assert!(provider.is_signed_in().await);
    }

    #[tokio::test]
    async fn recover_reports_provider_rejections() {
        let router = Router::new().route(
            "/recover",
            post(|| async {
                (
                    axum::http::StatusCode::UNPROCESSABLE_ENTITY,
                    Json(serde_json::json!({ "msg": "Unable to validate email address" })),
                )
            }),
        );
        let provider = provider(serve(router).await);

        let error = provider.reset_password("not-an-email").await.unwrap_err();
        assert!(matches!(error, ClientError::Auth(_)));
    }
}
