//! HTTP transport for the inventory API
//!
//! One reqwest client sits behind every domain service. Each request reads
//! the bearer token fresh from the token source, exchanges typed JSON, and
//! maps the response status onto [`ClientError`] in a single place. A 401
//! tears the session down through [`TokenSource::invalidate`] with the
//! generation captured before the request was sent, so concurrent rejections
//! cause exactly one teardown and rejections of an already-replaced session
//! are ignored.

use std::sync::Arc;

use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use stocktake_config::ApiConfig;
use tracing::{debug, warn};

use crate::errors::{ClientError, ClientResult};
use crate::session::TokenSource;

/// Typed JSON transport with central status mapping.
#[derive(Clone)]
pub struct ApiTransport {
    http: reqwest::Client,
    base: String,
    tokens: Arc<dyn TokenSource>,
}

impl ApiTransport {
    /// Build the transport from the api domain configuration.
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenSource>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        let base = Url::parse(&config.base_url)?;
        Ok(Self {
            http,
            base: base.as_str().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request(Method::GET, path, &[], None::<&()>).await
    }

    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        self.request(Method::GET, path, query, None::<&()>).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    /// POST without a body; parameters travel in the query string.
    pub async fn post_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        self.request(Method::POST, path, query, None::<&()>).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    /// DELETE expecting `204 No Content`.
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.send(Method::DELETE, path, &[], None::<&()>).await?;
        Ok(())
    }

    /// DELETE whose response carries a confirmation envelope.
    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request(Method::DELETE, path, &[], None::<&()>).await
    }

    async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(method, path, query, body).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> ClientResult<reqwest::Response> {
        let url = format!("{}{path}", self.base);
        // Captured before the request: a 401 may only tear down the session
        // it was issued against.
        let generation = self.tokens.generation().await;

        let mut request = self.http.request(method.clone(), &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.tokens.bearer_token().await {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, %url, "api request");
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            if self.tokens.invalidate(generation).await {
                warn!(%method, %url, "token rejected, session torn down");
            } else {
                debug!(%method, %url, "401 for a superseded session, teardown skipped");
            }
            return Err(ClientError::Auth("session is no longer valid".to_string()));
        }
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        Err(map_failure(&method, status, &body))
    }
}

fn map_failure(method: &Method, status: StatusCode, body: &[u8]) -> ClientError {
    let detail = error_detail(body);
    match status {
        StatusCode::FORBIDDEN => ClientError::Forbidden {
            detail: detail.unwrap_or_else(|| "insufficient permissions".to_string()),
        },
        StatusCode::NOT_FOUND => ClientError::NotFound,
        StatusCode::CONFLICT => ClientError::Conflict {
            detail: detail.unwrap_or_else(|| "conflicting state".to_string()),
        },
        // The backend reports referentially blocked deletes as 400 with a
        // human-readable detail.
        StatusCode::BAD_REQUEST if *method == Method::DELETE => ClientError::Conflict {
            detail: detail.unwrap_or_else(|| "delete blocked by related records".to_string()),
        },
        status if status.is_client_error() => ClientError::Validation {
            detail: detail.unwrap_or_else(|| format!("request rejected with status {status}")),
        },
        status => ClientError::Server {
            status: status.as_u16(),
        },
    }
}

/// Error payloads arrive as `{"detail": <string or structured value>}`.
fn error_detail(body: &[u8]) -> Option<String> {
    #[derive(serde::Deserialize)]
    struct Body {
        detail: serde_json::Value,
    }
    match serde_json::from_slice::<Body>(body).ok()?.detail {
        serde_json::Value::String(detail) => Some(detail),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MockTokenSource;
    use axum::http::HeaderMap;
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn transport(base: String, tokens: MockTokenSource) -> ApiTransport {
        let config = ApiConfig {
            base_url: base,
            ..Default::default()
        };
        ApiTransport::new(&config, Arc::new(tokens)).unwrap()
    }

    fn signed_in_tokens() -> MockTokenSource {
        let mut tokens = MockTokenSource::new();
        tokens.expect_generation().returning(|| 1);
        tokens
            .expect_bearer_token()
            .returning(|| Some("token-1".to_string()));
        tokens
    }

    #[tokio::test]
    async fn bearer_token_is_attached_fresh_per_request() {
        let router = Router::new().route(
            "/api/ping",
            get(|headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(serde_json::json!({ "auth": auth }))
            }),
        );
        let transport = transport(serve(router).await, signed_in_tokens());

        let body: serde_json::Value = transport.get("/api/ping").await.unwrap();
        assert_eq!(body["auth"], "Bearer token-1");
    }

    #[tokio::test]
    async fn unauthorized_invalidates_the_captured_generation() {
        let router = Router::new().route(
            "/api/assets",
            get(|| async { axum::http::StatusCode::UNAUTHORIZED }),
        );
        let mut tokens = signed_in_tokens();
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        tokens.expect_invalidate().returning(|generation| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            assert_eq!(generation, 1);
            true
        });
        let transport = transport(serve(router).await, tokens);

        let error = transport.get::<serde_json::Value>("/api/assets").await.unwrap_err();

        assert!(matches!(error, ClientError::Auth(_)));
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn status_mapping_covers_the_error_taxonomy() {
        let router = Router::new()
            .route(
                "/api/forbidden",
                get(|| async {
                    (
                        axum::http::StatusCode::FORBIDDEN,
                        Json(serde_json::json!({ "detail": "Insufficient permissions" })),
                    )
                }),
            )
            .route(
                "/api/missing",
                get(|| async { axum::http::StatusCode::NOT_FOUND }),
            )
            .route(
                "/api/invalid",
                post(|| async {
                    (
                        axum::http::StatusCode::BAD_REQUEST,
                        Json(serde_json::json!({ "detail": "Asset tag already exists" })),
                    )
                }),
            )
            .route(
                "/api/broken",
                get(|| async { axum::http::StatusCode::INTERNAL_SERVER_ERROR }),
            );
        let transport = transport(serve(router).await, signed_in_tokens());

        let forbidden = transport
            .get::<serde_json::Value>("/api/forbidden")
            .await
            .unwrap_err();
        assert!(
            matches!(forbidden, ClientError::Forbidden { ref detail } if detail == "Insufficient permissions")
        );

        let missing = transport.get::<serde_json::Value>("/api/missing").await.unwrap_err();
        assert!(matches!(missing, ClientError::NotFound));

        let invalid = transport
            .post::<_, serde_json::Value>("/api/invalid", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(
            matches!(invalid, ClientError::Validation { ref detail } if detail == "Asset tag already exists")
        );

        let broken = transport.get::<serde_json::Value>("/api/broken").await.unwrap_err();
        assert!(matches!(broken, ClientError::Server { status: 500 }));
    }

    #[tokio::test]
    async fn bad_request_on_delete_reads_as_conflict() {
        let router = Router::new().route(
            "/api/assets/{id}",
            delete(|| async {
                (
                    axum::http::StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                        "detail": "Cannot delete asset with active assignments"
                    })),
                )
            }),
        );
        let transport = transport(serve(router).await, signed_in_tokens());

        let error = transport.delete("/api/assets/42").await.unwrap_err();

        assert!(
            matches!(error, ClientError::Conflict { ref detail } if detail == "Cannot delete asset with active assignments")
        );
    }

    #[tokio::test]
    async fn requests_without_a_session_send_no_bearer() {
        let router = Router::new().route(
            "/api/auth/signup",
            post(|headers: HeaderMap| async move {
                assert!(headers.get("authorization").is_none());
                Json(serde_json::json!({ "ok": true }))
            }),
        );
        let mut tokens = MockTokenSource::new();
        tokens.expect_generation().returning(|| 0);
        tokens.expect_bearer_token().returning(|| None);
        let transport = transport(serve(router).await, tokens);

        let body: serde_json::Value = transport
            .post("/api/auth/signup", &serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(body["ok"], true);
    }

    #[test]
    fn structured_validation_detail_is_rendered() {
        let body = serde_json::to_vec(&serde_json::json!({
            "detail": [{ "loc": ["body", "email"], "msg": "field required" }]
        }))
        .unwrap();
        let error = map_failure(&Method::POST, StatusCode::UNPROCESSABLE_ENTITY, &body);
        match error {
            ClientError::Validation { detail } => assert!(detail.contains("field required")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
