use axum::{
    extract::{Extension, Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::app::AppState;
use crate::auth::OwnerClaim;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

use super::parse_user_id;

#[derive(Debug, Deserialize)]
pub struct CreateProject {
    /// One arbitrary attribute object per device to create
    #[serde(default)]
    pub devices: Vec<Map<String, Value>>,
}

/// POST /projects/:userId - create the caller's project and its devices.
/// Also mounted at POST /create_project/:userId.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(body): Json<CreateProject>,
) -> Result<Json<Value>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let claim = OwnerClaim::new(auth.user_id);

    let project = state.projects.create(&claim, user_id, body.devices).await?;
    Ok(Json(json!({ "project": project })))
}
