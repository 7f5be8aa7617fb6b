//! Shared harness for API integration tests.
//!
//! Builds the production router over the in-memory collaborators, so no
//! database is needed. Requests go through `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use boardwalk_core::memory::{InMemoryAccountDirectory, InMemoryBoardStore};
use boardwalk_core::roles::ROLE_USER;
use boardwalk_core::service::BoardService;
use boardwalk_core::types::DbId;
use boardwalk_events::EventBus;
use http_body_util::BodyExt;
use tower::ServiceExt;

use boardwalk_api::auth::jwt::{generate_access_token, JwtConfig};
use boardwalk_api::cache::BoardListCache;
use boardwalk_api::config::{ServerConfig, StoreBackend};
use boardwalk_api::router::build_app_router;
use boardwalk_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        board_store: StoreBackend::Memory,
        board_list_cache: true,
        memory_accounts: vec![],
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// A running application plus handles on its collaborators.
pub struct TestApp {
    pub state: AppState,
    pub config: ServerConfig,
    pub accounts: Arc<InMemoryAccountDirectory>,
}

impl TestApp {
    /// The full router, with every middleware layer `main` installs.
    pub fn router(&self) -> Router {
        build_app_router(self.state.clone(), &self.config)
    }

    /// A Bearer token for `account_id`.
    pub fn token(&self, account_id: DbId) -> String {
        generate_access_token(account_id, ROLE_USER, &self.config.jwt)
            .expect("token generation should succeed")
    }
}

/// Build an app whose directory knows `active` as active accounts.
pub async fn build_test_app(active: &[DbId]) -> TestApp {
    let config = test_config();
    let accounts = Arc::new(InMemoryAccountDirectory::with_active(active).await);
    let store = Arc::new(InMemoryBoardStore::new());

    let state = AppState {
        pool: None,
        config: Arc::new(config.clone()),
        boards: BoardService::new(store, accounts.clone()),
        list_cache: Arc::new(BoardListCache::new(config.board_list_cache)),
        event_bus: Arc::new(EventBus::default()),
    };

    TestApp {
        state,
        config,
        accounts,
    }
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, Method::GET, uri, token, None).await
}

pub async fn post(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, Method::POST, uri, token, None).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, token, Some(body)).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, token, Some(body)).await
}

pub async fn delete(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, Method::DELETE, uri, token, None).await
}

pub async fn delete_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::DELETE, uri, token, Some(body)).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a board as `owner` and return its id.
pub async fn create_board(app: &TestApp, owner: DbId, body: serde_json::Value) -> DbId {
    let token = app.token(owner);
    let response = post_json(app.router(), "/api/v1/boards", Some(&token), body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
