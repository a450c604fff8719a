//! Authorization end-to-end test
//!
//! Validates both halves of the permission story against stub backends:
//! 1. The advisory gate derives affordances from the resolved role
//! 2. Server-side denials surface as typed forbidden errors and leave the
//!    session alone
//! 3. A burst of concurrent 401s tears the session down exactly once
//! 4. Requests after the teardown stay signed out without further events
//! 5. Signing back in starts a fresh generation and working requests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use stocktake_api_types::{
    Action, Asset, AssetFilter, AssignmentFilter, CreateUser, EmployeeFilter, Resource, Role,
};
use stocktake_client::{ClientError, SessionEvent, StocktakeClient, TokenSource};
use stocktake_config::StocktakeConfig;
use tokio::net::TcpListener;

/// Helper to suppress logging output during test execution
fn init_quiet_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    // Forced teardowns log warnings on purpose here, so only errors pass.
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

/// Identity stub issuing numbered access tokens so API stubs can treat
/// earlier tokens as revoked.
fn identity_router(issued: Arc<AtomicUsize>) -> Router {
    Router::new().route(
        "/token",
        post(move || {
            let sequence = issued.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                Json(json!({
                    "access_token": format!("access-{sequence}"),
                    "token_type": "bearer",
                    "expires_in": 3600,
                    "refresh_token": format!("refresh-{sequence}"),
                    "user": {
                        "id": "7a1e2f9c-1111-4222-8333-944445555666",
                        "email": "quinn@initech.example",
                        "user_metadata": {}
                    }
                }))
            }
        }),
    )
}

fn profile_with_role(role: &str) -> Value {
    json!({
        "id": "0d9f2dd4-9c3b-4f6e-9a51-0a4f44a1f001",
        "email": "quinn@initech.example",
        "name": "Quinn Park",
        "tenant_id": "4f6e9a51-0a4f-44a1-b001-0d9f2dd49c3b",
        "role": role,
        "status": "active"
    })
}

async fn tenant_info() -> Json<Value> {
    Json(json!({
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
    }))
}

/// Lists succeed for any bearer except the revoked first token.
async fn assets_unless_revoked(headers: HeaderMap) -> Result<Json<Vec<Asset>>, StatusCode> {
    match headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
    {
        Some("Bearer access-1") | None => Err(StatusCode::UNAUTHORIZED),
        Some(_) => Ok(Json(Vec::new())),
    }
}

async fn signed_in_client(api: Router) -> Result<StocktakeClient> {
    let mut config = StocktakeConfig::default();
    config.auth.url = serve(identity_router(Arc::new(AtomicUsize::new(0)))).await?;
    config.api.base_url = serve(api).await?;
    let client = StocktakeClient::new(&config)?;
    client.sign_in("quinn@initech.example", "hunter2").await?;
    Ok(client)
}

#[tokio::test]
async fn test_gate_affordances_follow_the_resolved_role() -> Result<()> {
    init_quiet_logging();
    println!("🧪 Testing advisory gate affordances for a staff profile...");

    let api = Router::new()
        .route(
            "/api/auth/me",
            get(|| async { Json(profile_with_role("staff")) }),
        )
        .route("/api/tenants/current/info", get(tenant_info));
    let client = signed_in_client(api).await?;
    let context = client.context();

    assert_eq!(context.effective_role().await, Role::Staff);
    assert!(context.allows(Resource::Assets, Action::Read).await);
    assert!(context.allows(Resource::Assignments, Action::Read).await);
    assert!(!context.allows(Resource::Assets, Action::Create).await);
    assert!(!context.allows(Resource::Users, Action::Read).await);
    assert!(!context.allows(Resource::AuditLogs, Action::Read).await);

    println!("✅ Gate affordances matched the resolved role");
    Ok(())
}

#[tokio::test]
async fn test_server_denials_surface_as_typed_forbidden_errors() -> Result<()> {
    init_quiet_logging();
    println!("🧪 Testing server-side denial mapping...");

    let api = Router::new()
        .route(
            "/api/users",
            post(|| async {
                (
                    StatusCode::FORBIDDEN,
                    Json(json!({ "detail": "Staff cannot manage users" })),
                )
            }),
        )
        .route(
            "/api/auth/me",
            get(|| async { Json(profile_with_role("staff")) }),
        )
        .route("/api/tenants/current/info", get(tenant_info));
    let client = signed_in_client(api).await?;

    let request = CreateUser {
        name: "Sasha Lee".to_string(),
        email: "sasha.lee@initech.example".to_string(),
        ..Default::default()
    };
    let error = client.users().create(&request).await.unwrap_err();

    match error {
        ClientError::Forbidden { detail } => assert_eq!(detail, "Staff cannot manage users"),
        other => anyhow::bail!("expected a forbidden error, got {other:?}"),
    }
    // Only the operation was denied; the session itself stays valid.
    assert!(client.session().is_signed_in().await);
    assert_eq!(client.session().generation().await, 1);

    println!("✅ Denial surfaced as a typed forbidden error");
    Ok(())
}

#[tokio::test]
async fn test_concurrent_401s_tear_the_session_down_once() -> Result<()> {
    init_quiet_logging();
    println!("🧪 Testing single teardown under a concurrent 401 burst...");

    let api = Router::new()
        .route("/api/assets", get(|| async { StatusCode::UNAUTHORIZED }))
        .route("/api/employees", get(|| async { StatusCode::UNAUTHORIZED }))
        .route("/api/assignments", get(|| async { StatusCode::UNAUTHORIZED }))
        .route(
            "/api/auth/me",
            get(|| async { Json(profile_with_role("manager")) }),
        )
        .route("/api/tenants/current/info", get(tenant_info));
    let client = signed_in_client(api).await?;
    let mut events = client.subscribe();
    assert_eq!(client.session().generation().await, 1);

    let asset_service = client.assets();
    let employee_service = client.employees();
    let assignment_service = client.assignments();
    let asset_filter = AssetFilter::default();
    let employee_filter = EmployeeFilter::default();
    let assignment_filter = AssignmentFilter::default();
    let (assets, employees, assignments, again) = tokio::join!(
        asset_service.list(&asset_filter),
        employee_service.list(&employee_filter),
        assignment_service.list(&assignment_filter),
        asset_service.assignable(),
    );

    assert!(matches!(assets, Err(ClientError::Auth(_))));
    assert!(matches!(employees, Err(ClientError::Auth(_))));
    assert!(matches!(assignments, Err(ClientError::Auth(_))));
    assert!(matches!(again, Err(ClientError::Auth(_))));

    // Four rejections, one teardown: the generation moved exactly one step.
    assert!(!client.session().is_signed_in().await);
    assert_eq!(client.session().generation().await, 2);
    assert!(events.has_changed()?);
    assert_eq!(
        *events.borrow_and_update(),
        SessionEvent::SignedOut { forced: true }
    );
    assert!(!events.has_changed()?);

    // A stray request afterwards is rejected without a second teardown.
    let error = client
        .assets()
        .list(&AssetFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(error, ClientError::Auth(_)));
    assert_eq!(client.session().generation().await, 2);
    assert!(!events.has_changed()?);

    println!("✅ Concurrent rejections caused exactly one teardown");
    Ok(())
}

#[tokio::test]
async fn test_sign_in_after_teardown_starts_a_fresh_generation() -> Result<()> {
    init_quiet_logging();
    println!("🧪 Testing recovery after a forced teardown...");

    let api = Router::new()
        .route("/api/assets", get(assets_unless_revoked))
        .route(
            "/api/auth/me",
            get(|| async { Json(profile_with_role("manager")) }),
        )
        .route("/api/tenants/current/info", get(tenant_info));
    let mut config = StocktakeConfig::default();
    config.auth.url = serve(identity_router(Arc::new(AtomicUsize::new(0)))).await?;
    config.api.base_url = serve(api).await?;
    let client = StocktakeClient::new(&config)?;
    let mut events = client.subscribe();

    client.sign_in("quinn@initech.example", "hunter2").await?;
    let error = client
        .assets()
        .list(&AssetFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(error, ClientError::Auth(_)));
    assert!(!client.session().is_signed_in().await);

    client.sign_in("quinn@initech.example", "hunter2").await?;

    // Sign-in, teardown, sign-in: three transitions, generation 3.
    assert_eq!(client.session().generation().await, 3);
    assert!(events.has_changed()?);
    assert_eq!(
        *events.borrow_and_update(),
        SessionEvent::SignedIn { generation: 3 }
    );
    let assets = client.assets().list(&AssetFilter::default()).await?;
    assert!(assets.is_empty());
    assert_eq!(client.context().effective_role().await, Role::Manager);

    println!("✅ Recovery installed a fresh session");
    Ok(())
}
