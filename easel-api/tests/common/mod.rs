//! Common test utilities for integration tests
//!
//! - Test app with or without a database
//! - JWT token generation
//! - JSON request helpers
//! - User registration through the API

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use easel_api::app::{build_router, AppState};
use easel_api::config::Config;
use easel_shared::auth::jwt::{create_token, Claims, TokenType};
use easel_shared::db::{migrations::run_migrations, Database};
use easel_shared::models::user::{UserRole, UserType};
use easel_shared::storage::MemoryBlobStore;
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tower::Service as _;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing the app and its resources
pub struct TestContext {
    pub app: axum::Router,
    pub config: Config,
    pub blobs: MemoryBlobStore,
    pub pool: Option<PgPool>,
}

/// Builds a config from explicit variables
pub fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("JWT_SECRET".to_string(), JWT_SECRET.to_string());
    for (key, value) in extra {
        vars.insert(key.to_string(), value.to_string());
    }

    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

impl TestContext {
    /// App with no database configured
    pub fn without_database() -> Self {
        Self::build(Database::unavailable(), None, test_config(&[]))
    }

    /// App backed by `TEST_DATABASE_URL` (or `DATABASE_URL`), migrated
    ///
    /// `owner_email` is registered as admin.
    pub async fn with_database(owner_email: &str) -> anyhow::Result<Self> {
        let url = std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL"))?;
        let pool = PgPool::connect(&url).await?;
        run_migrations(&pool).await?;

        let config = test_config(&[("OWNER_EMAIL", owner_email)]);
        Ok(Self::build(
            Database::connected(pool.clone()),
            Some(pool),
            config,
        ))
    }

    fn build(db: Database, pool: Option<PgPool>, config: Config) -> Self {
        let blobs = MemoryBlobStore::new();
        let state = AppState::new(db, config.clone(), Arc::new(blobs.clone()));

        Self {
            app: build_router(state),
            config,
            blobs,
            pool,
        }
    }

    /// Sends a request and returns the status and JSON body (`Null` if empty)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, token, Some(body)).await
    }

    /// Registers a user through the API, returning `(user_id, access_token)`
    pub async fn register(&self, email: &str) -> (Uuid, String) {
        let (status, body) = self
            .post(
                "/v1/auth/register",
                None,
                serde_json::json!({
                    "email": email,
                    "password": "gallery-pass-42",
                    "name": "Test User"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        let user_id = body["user"]["id"].as_str().unwrap().parse().unwrap();
        let token = body["access_token"].as_str().unwrap().to_string();
        (user_id, token)
    }
}

/// Access token for a user that need not exist
pub fn access_token(user_id: Uuid, user_type: UserType, role: UserRole) -> String {
    let claims = Claims::new(user_id, user_type, role, TokenType::Access);
    create_token(&claims, JWT_SECRET).unwrap()
}

/// Unique email for a test run
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4())
}
