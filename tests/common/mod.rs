use std::sync::Arc;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use fleet_api::app::{app, AppState};
use fleet_api::auth::{generate_jwt, Claims};
use fleet_api::store::memory::MemStore;
use fleet_api::store::models::User;

pub const JWT_SECRET: &str = "integration-test-secret";

/// Router over a fresh in-memory store, plus direct store access for
/// seeding users and asserting on persisted state.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemStore>,
}

pub fn test_app() -> TestApp {
    let store = Arc::new(MemStore::new());
    let state = AppState::new(store.clone(), JWT_SECRET);
    TestApp {
        router: app(state),
        store,
    }
}

impl TestApp {
    pub async fn seed_user(&self, name: &str) -> User {
        self.store
            .seed_user(name, &format!("{}@example.com", name))
            .await
    }
}

pub fn token_for(user_id: Uuid) -> String {
    generate_jwt(&Claims::new(user_id, 1), JWT_SECRET).expect("token")
}

/// Drive the router in-process and decode the JSON body (Null for an
/// empty body).
pub async fn request(
    router: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = router
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| anyhow::anyhow!("router error: {e}"))?;
    let status = response.status();

    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, value))
}
