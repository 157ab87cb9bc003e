use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;

/// GET /projects - list every project with user and devices expanded
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let projects = state.projects.list_all().await?;
    Ok(Json(json!({ "projects": projects })))
}
