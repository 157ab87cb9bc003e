use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, put};
use axum::{middleware, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::projects;
use crate::middleware::auth::jwt_auth_middleware;
use crate::services::ProjectService;
use crate::store::Store;

/// Shared per-process state. The store handle is injected here rather than
/// held in a process-wide singleton, so tests can swap in a fake store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub projects: Arc<ProjectService>,
    pub jwt_secret: String,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, jwt_secret: impl Into<String>) -> Self {
        Self {
            projects: Arc::new(ProjectService::new(Arc::clone(&store))),
            store,
            jwt_secret: jwt_secret.into(),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Protected resources
        .merge(project_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn project_routes(state: AppState) -> Router<AppState> {
    use axum::routing::post;

    // The first `/projects` segment is `:id` in every overlapping route
    // (the router requires one name per position); what it identifies
    // depends on the method: a user for GET/POST, a project for PUT, a
    // device for DELETE.
    Router::new()
        .route("/create_project/:user_id", post(projects::create))
        .route("/projects", get(projects::list))
        .route("/projects/", get(projects::list))
        .route("/projects/:id", get(projects::show).post(projects::create))
        .route(
            "/projects/:id/:user_id",
            put(projects::update).delete(projects::destroy_device),
        )
        .route("/projects/:id/:user_id/:device_id", put(projects::append))
        .route(
            "/projects/device/:device_id/:project_id/:user_id",
            delete(projects::remove_device),
        )
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Fleet API",
        "version": version,
        "description": "Project and device management API built with Rust (Axum)",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "projects": "/projects[/:userId] (protected)",
            "create_project": "/create_project/:userId (protected)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": "ok"
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "store_error": e.to_string()
            })),
        ),
    }
}
