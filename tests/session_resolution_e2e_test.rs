//! Session lifecycle and identity resolution end-to-end test
//!
//! Runs a GoTrue-style identity stub next to an inventory API stub and
//! validates the full session story through the client facade:
//! 1. Sign-in resolves the caller's profile, tenant and role in one pass
//! 2. Sign-out drops the session and every piece of resolved state
//! 3. A configured refresh token restores the session at startup
//! 4. A revoked refresh token starts the client signed out, not broken
//! 5. Startup and resolution waits stay within their configured bounds
//! 6. Without any role signal the caller gates as a viewer

use std::time::Duration;

use anyhow::Result;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use stocktake_api_types::{Action, Resource, Role};
use stocktake_client::{SessionEvent, StocktakeClient};
use stocktake_config::StocktakeConfig;
use tokio::net::TcpListener;
use tokio::time::timeout;

/// Helper to suppress logging output during test execution
fn init_quiet_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    // Several scenarios trigger intentional warn-level logs (timeouts,
    // revoked tokens), so only errors get through.
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::ERROR)
            .with_target(false)
            .without_time()
            .try_init();
    });
}

/// Serve a router on an ephemeral port and return its base URL
async fn serve(router: Router) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Ok(format!("http://{addr}"))
}

/// GoTrue-style token grant response
fn token_response(metadata: Value) -> Json<Value> {
    Json(json!({
        "access_token": "access-1",
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "refresh-1",
        "user": {
            "id": "7a1e2f9c-1111-4222-8333-944445555666",
            "email": "morgan@initech.example",
            "user_metadata": metadata
        }
    }))
}

/// Identity stub: token grants succeed, logout is accepted
fn identity_router(metadata: Value) -> Router {
    Router::new()
        .route(
            "/token",
            post(move || {
                let metadata = metadata.clone();
                async move { token_response(metadata) }
            }),
        )
        .route("/logout", post(|| async { StatusCode::NO_CONTENT }))
}

fn profile_body(role: Option<&str>) -> Value {
    json!({
        "id": "0d9f2dd4-9c3b-4f6e-9a51-0a4f44a1f001",
        "email": "morgan@initech.example",
        "name": "Morgan Hale",
        "tenant_id": "4f6e9a51-0a4f-44a1-b001-0d9f2dd49c3b",
        "role": role,
        "status": "active"
    })
}

fn tenant_body() -> Value {
    json!({
        "id": "4f6e9a51-0a4f-44a1-b001-0d9f2dd49c3b",
        "name": "Initech",
        "slug": "initech",
        "logo_url": null,
        "theme": null,
        "status": "active",
        "subscription_plan": "premium",
        "subscription_status": "active",
        "subscription_expires_at": null,
        "settings": null,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    })
}

/// Backend stub answering the two resolution endpoints
fn resolution_router(role: &'static str) -> Router {
    Router::new()
        .route(
            "/api/auth/me",
            get(move || async move { Json(profile_body(Some(role))) }),
        )
        .route(
            "/api/tenants/current/info",
            get(|| async { Json(tenant_body()) }),
        )
}

async fn config_for(identity: Router, api: Router) -> Result<StocktakeConfig> {
    let mut config = StocktakeConfig::default();
    config.auth.url = serve(identity).await?;
    config.api.base_url = serve(api).await?;
    Ok(config)
}

#[tokio::test]
async fn test_sign_in_resolves_profile_tenant_and_role() -> Result<()> {
    init_quiet_logging();
    println!("🧪 Testing sign-in with full identity resolution...");

    let config = config_for(identity_router(json!({})), resolution_router("manager")).await?;
    let client = StocktakeClient::new(&config)?;
    let mut events = client.subscribe();

    let session = client.sign_in("morgan@initech.example", "hunter2").await?;
    assert_eq!(session.access_token, "access-1");
    assert!(client.session().is_signed_in().await);

    let snapshot = client.context().snapshot().await;
    let user = snapshot.user.expect("profile should be resolved");
    assert_eq!(user.email, "morgan@initech.example");
    assert_eq!(user.name.as_deref(), Some("Morgan Hale"));
    let tenant = snapshot.tenant.expect("tenant should be resolved");
    assert_eq!(tenant.name, "Initech");
    assert_eq!(tenant.slug, "initech");
    assert_eq!(client.context().effective_role().await, Role::Manager);

    assert!(events.has_changed()?);
    assert_eq!(
        *events.borrow_and_update(),
        SessionEvent::SignedIn { generation: 1 }
    );

    println!("✅ Sign-in resolved profile, tenant and role");
    Ok(())
}

#[tokio::test]
async fn test_sign_out_drops_session_and_resolved_state() -> Result<()> {
    init_quiet_logging();
    println!("🧪 Testing sign-out teardown...");

    let config = config_for(
        identity_router(json!({})),
        resolution_router("tenant_admin"),
    )
    .await?;
    let client = StocktakeClient::new(&config)?;
    client.sign_in("morgan@initech.example", "hunter2").await?;
    assert_eq!(client.context().effective_role().await, Role::TenantAdmin);
    let mut events = client.subscribe();

    client.sign_out().await;

    assert!(!client.session().is_signed_in().await);
    let snapshot = client.context().snapshot().await;
    assert!(snapshot.user.is_none());
    assert!(snapshot.tenant.is_none());
    assert!(snapshot.role.is_pending());
    assert_eq!(client.context().effective_role().await, Role::Viewer);
    assert!(events.has_changed()?);
    assert_eq!(
        *events.borrow_and_update(),
        SessionEvent::SignedOut { forced: false }
    );

    println!("✅ Sign-out dropped the session and resolved state");
    Ok(())
}

#[tokio::test]
async fn test_refresh_token_restores_the_session_at_startup() -> Result<()> {
    init_quiet_logging();
    println!("🧪 Testing startup restore from a refresh token...");

    let mut config = config_for(identity_router(json!({})), resolution_router("staff")).await?;
    config.auth.refresh_token = Some("refresh-0".to_string());
    let client = StocktakeClient::new(&config)?;

    assert!(client.startup().await);
    assert!(client.session().is_signed_in().await);
    assert_eq!(client.context().effective_role().await, Role::Staff);

    println!("✅ Startup restored and resolved the session");
    Ok(())
}

#[tokio::test]
async fn test_revoked_refresh_token_starts_signed_out() -> Result<()> {
    init_quiet_logging();
    println!("🧪 Testing startup with a revoked refresh token...");

    let identity = Router::new().route(
        "/token",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_grant",
                    "error_description": "Refresh token has been revoked"
                })),
            )
        }),
    );
    let mut config = config_for(identity, Router::new()).await?;
    config.auth.refresh_token = Some("refresh-stale".to_string());
    let client = StocktakeClient::new(&config)?;

    // A failed restore is a signed-out start, not an error.
    assert!(!client.startup().await);
    assert!(!client.session().is_signed_in().await);

    println!("✅ Revoked token left the client signed out");
    Ok(())
}

#[tokio::test]
async fn test_stalled_identity_keeps_startup_bounded() -> Result<()> {
    init_quiet_logging();
    println!("🧪 Testing startup bound against a stalled identity provider...");

    let identity = Router::new().route(
        "/token",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            token_response(json!({}))
        }),
    );
    let mut config = config_for(identity, Router::new()).await?;
    config.auth.refresh_token = Some("refresh-0".to_string());
    config.auth.startup_timeout = Duration::from_millis(100);
    let client = StocktakeClient::new(&config)?;

    // The outer timeout proves the configured bound is what cuts the wait.
    let restored = timeout(Duration::from_secs(5), client.startup()).await?;
    assert!(!restored);
    assert!(!client.session().is_signed_in().await);

    println!("✅ Startup gave up within its configured bound");
    Ok(())
}

#[tokio::test]
async fn test_slow_profile_falls_back_to_the_identity_claim() -> Result<()> {
    init_quiet_logging();
    println!("🧪 Testing bounded resolution with an identity role claim...");

    let api = Router::new()
        .route(
            "/api/auth/me",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Json(profile_body(Some("tenant_admin")))
            }),
        )
        .route(
            "/api/tenants/current/info",
            get(|| async { Json(tenant_body()) }),
        );
    let mut config = config_for(identity_router(json!({ "role": "manager" })), api).await?;
    config.auth.resolve_timeout = Duration::from_millis(100);
    let client = StocktakeClient::new(&config)?;

    let signed_in = timeout(
        Duration::from_secs(5),
        client.sign_in("morgan@initech.example", "hunter2"),
    )
    .await?;
    signed_in?;

    let snapshot = client.context().snapshot().await;
    assert!(snapshot.user.is_none(), "profile fetch should have timed out");
    assert_eq!(
        snapshot.tenant.map(|tenant| tenant.name),
        Some("Initech".to_string())
    );
    assert_eq!(client.context().effective_role().await, Role::Manager);

    println!("✅ Resolution stayed bounded and used the identity claim");
    Ok(())
}

#[tokio::test]
async fn test_no_role_signal_gates_as_viewer() -> Result<()> {
    init_quiet_logging();
    println!("🧪 Testing sign-in without any role signal...");

    let api = Router::new()
        .route("/api/auth/me", get(|| async { Json(profile_body(None)) }))
        .route(
            "/api/tenants/current/info",
            get(|| async { Json(tenant_body()) }),
        );
    let config = config_for(identity_router(json!({})), api).await?;
    let client = StocktakeClient::new(&config)?;

    client.sign_in("morgan@initech.example", "hunter2").await?;

    let snapshot = client.context().snapshot().await;
    assert!(snapshot.user.is_some());
    assert!(snapshot.role.is_pending());
    assert_eq!(client.context().effective_role().await, Role::Viewer);
    assert!(client.context().allows(Resource::Assets, Action::Read).await);
    assert!(!client.context().allows(Resource::Assets, Action::Create).await);

    println!("✅ Unresolved role gated as a viewer");
    Ok(())
}
