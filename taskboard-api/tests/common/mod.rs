//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - An in-memory task store that counts calls
//! - Configuration without environment variables
//! - Session token generation
//! - Request helpers driving the router in-process
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::Value;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::auth::jwt::{create_token, Claims};
use taskboard_shared::models::task::{NewTask, PositionUpdate, Task, UpdateTask};
use taskboard_shared::store::{memory::MemoryTaskStore, StoreResult, TaskStore};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Memory store that records how often it was touched
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryTaskStore,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.reads() + self.writes()
    }

    fn read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }

    fn write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TaskStore for CountingStore {
    async fn list(&self, user_id: Option<Uuid>) -> StoreResult<Vec<Task>> {
        self.read();
        self.inner.list(user_id).await
    }

    async fn get_by_id(&self, id: Uuid, user_id: Option<Uuid>) -> StoreResult<Option<Task>> {
        self.read();
        self.inner.get_by_id(id, user_id).await
    }

    async fn create(&self, data: NewTask) -> StoreResult<Task> {
        self.write();
        self.inner.create(data).await
    }

    async fn update(&self, id: Uuid, changes: UpdateTask) -> StoreResult<Task> {
        self.write();
        self.inner.update(id, changes).await
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Task> {
        self.write();
        self.inner.delete(id).await
    }

    async fn bulk_reposition(&self, updates: &[PositionUpdate]) -> StoreResult<()> {
        self.write();
        self.inner.bulk_reposition(updates).await
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.inner.health_check().await
    }
}

/// A decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// Field names of a validation failure's details
    pub fn issue_fields(&self) -> Vec<String> {
        self.body["details"]
            .as_array()
            .map(|details| {
                details
                    .iter()
                    .filter_map(|d| d["field"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: Router,
    pub store: Arc<CountingStore>,
    pub config: Config,
    pub user_id: Uuid,
    pub token: String,
}

impl TestContext {
    /// Creates a context over an empty in-memory store
    pub fn new() -> Self {
        Self::with_vars(&[])
    }

    /// Creates a context with extra configuration variables
    pub fn with_vars(extra: &[(&str, &str)]) -> Self {
        let mut vars = vec![
            ("TASKBOARD_STORE".to_string(), "memory".to_string()),
            ("JWT_SECRET".to_string(), TEST_SECRET.to_string()),
        ];
        vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        let config = Config::from_lookup(|key| {
            vars.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
        .expect("test config");

        let store = Arc::new(CountingStore::default());
        let app = build_router(AppState::new(store.clone(), config.clone()));

        let user_id = Uuid::new_v4();
        let token = token_for(user_id);

        Self {
            app,
            store,
            config,
            user_id,
            token,
        }
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Sends a request as the context's user
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        self.send_as(Some(self.token.as_str()), method, uri, body).await
    }

    /// Sends a request with an arbitrary bearer token, or none
    pub async fn send_as(
        &self,
        token: Option<&str>,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.dispatch(request).await
    }

    /// Sends a raw request
    pub async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };

        TestResponse { status, headers, body }
    }

    /// Creates a task through the API and returns its JSON
    pub async fn create_task(&self, token: &str, body: Value) -> Value {
        let response = self.send_as(Some(token), Method::POST, "/api/tasks", Some(body)).await;
        assert_eq!(response.status, StatusCode::CREATED, "create failed: {}", response.body);
        response.body
    }

    /// Lists tasks for a token
    pub async fn list(&self, token: &str) -> Vec<Value> {
        let response = self.send_as(Some(token), Method::GET, "/api/tasks", None).await;
        assert_eq!(response.status, StatusCode::OK);
        response.body.as_array().cloned().unwrap_or_default()
    }
}

/// Session token for a user
pub fn token_for(user_id: Uuid) -> String {
    create_token(&Claims::new(user_id), TEST_SECRET).expect("token")
}

/// Session token that expires soon
pub fn expiring_token_for(user_id: Uuid, expires_in: Duration) -> String {
    create_token(&Claims::with_expiration(user_id, expires_in), TEST_SECRET).expect("token")
}
