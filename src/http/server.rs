//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, panics)
//! - Bind server to listener
//! - Stop accepting and drain on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::handlers::{create_user, get_user, health_check, not_found};
use crate::http::middleware::track_metrics;
use crate::http::request::{request_id_of, MakeRequestUuidV4};
use crate::repository::UserRepository;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn UserRepository>,
}

/// HTTP server for the user service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server over the given repository.
    pub fn new(config: ServiceConfig, repository: Arc<dyn UserRepository>) -> Self {
        let state = AppState { repository };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(health_check))
            .route("/users", post(create_user))
            .route("/users/", post(create_user))
            .route("/users/{user_id}", get(get_user))
            .route_layer(middleware::from_fn(track_metrics))
            .fallback(not_found)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(CatchPanicLayer::new())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id_of(request),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::X_REQUEST_ID;
    use crate::model::User;
    use crate::repository::InMemoryUserRepository;
    use axum::http::{header, Method, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_router() -> (Router, InMemoryUserRepository) {
        let repo = InMemoryUserRepository::new();
        let server = HttpServer::new(ServiceConfig::default(), Arc::new(repo.clone()));
        (server.router(), repo)
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health_check() {
        let (router, _) = test_router();
        let (status, body) = send(&router, Method::GET, "/", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let (router, _) = test_router();

        let (status, body) = send(
            &router,
            Method::POST,
            "/users",
            Some(r#"{"id":"u1","name":"Alice","email":"a@x.com"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["id"], "u1");

        let (status, body) = send(&router, Method::GET, "/users/u1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["name"], "Alice");
        assert_eq!(body["user"]["email"], "a@x.com");
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let (router, repo) = test_router();
        let payload = r#"{"id":"u1","name":"Alice","email":"a@x.com"}"#;

        let (status, _) = send(&router, Method::POST, "/users", Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &router,
            Method::POST,
            "/users",
            Some(r#"{"id":"u1","name":"Someone Else"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["message"].as_str().unwrap().contains("u1"));
        assert!(body.get("user").is_none());

        let stored = repo.find_by_id("u1").await.unwrap().unwrap();
        assert_eq!(stored, User::new("u1", "Alice", Some("a@x.com".into())));
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let (router, _) = test_router();
        let (status, body) = send(&router, Method::GET, "/users/nonexistent", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["message"].as_str().unwrap().contains("nonexistent"));
        assert!(body.get("user").is_none());
    }

    #[tokio::test]
    async fn test_validation_happens_before_repository() {
        let (router, repo) = test_router();

        let (status, body) =
            send(&router, Method::POST, "/users", Some(r#"{"id":"","name":"Bob"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "ID and Name are required");

        // Missing field decodes as empty and is a validation error too
        let (status, _) = send(&router, Method::POST, "/users", Some(r#"{"id":"u9"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(repo.call_count(), 0);
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (router, repo) = test_router();

        let (status, body) = send(&router, Method::POST, "/users", Some("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid request body");

        let (status, _) = send(&router, Method::POST, "/users", Some("42")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(repo.call_count(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_is_opaque() {
        let (router, repo) = test_router();
        repo.set_unavailable(true);

        let (status, body) = send(
            &router,
            Method::POST,
            "/users",
            Some(r#"{"id":"u1","name":"Alice"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Failed to create user due to internal error");

        let (status, body) = send(&router, Method::GET, "/users/u1", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal database error");
    }

    #[tokio::test]
    async fn test_trailing_slash_create() {
        let (router, _) = test_router();
        let (status, _) = send(
            &router,
            Method::POST,
            "/users/",
            Some(r#"{"id":"u2","name":"Carol"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (router, _) = test_router();
        let (status, body) = send(&router, Method::GET, "/nope", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Resource not found");
    }

    #[tokio::test]
    async fn test_request_id_header() {
        let (router, _) = test_router();

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key(X_REQUEST_ID));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(X_REQUEST_ID, "client-id-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "client-id-1");
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let repo = InMemoryUserRepository::new();
        let mut config = ServiceConfig::default();
        config.limits.max_body_size = 16;
        let router = HttpServer::new(config, Arc::new(repo.clone())).router();

        let (status, _) = send(
            &router,
            Method::POST,
            "/users",
            Some(r#"{"id":"u1","name":"A very long name indeed"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(repo.is_empty());
    }
}
