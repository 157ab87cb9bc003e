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

use super::{parse_id, parse_user_id};

#[derive(Debug, Deserialize)]
pub struct ReplaceDevices {
    #[serde(default)]
    pub devices: Vec<Map<String, Value>>,
}

/// PUT /projects/:projectId/:userId - replace the project's device list
/// wholesale: previous devices are deleted, the new set is created.
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((project_id, user_id)): Path<(String, String)>,
    Json(body): Json<ReplaceDevices>,
) -> Result<Json<Value>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let project_id = parse_id(&project_id, "Error updating project")?;
    let claim = OwnerClaim::new(auth.user_id);

    let project = state
        .projects
        .replace_devices(&claim, project_id, user_id, body.devices)
        .await?;
    Ok(Json(json!({ "project": project })))
}
