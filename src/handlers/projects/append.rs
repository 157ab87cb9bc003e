use axum::{
    extract::{Extension, Path, State},
    response::Json,
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::OwnerClaim;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

use super::{parse_id, parse_user_id};

/// PUT /projects/:projectId/:userId/:deviceId - append an existing device
/// id to the project's device list and return the updated project
pub async fn append(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((project_id, user_id, device_id)): Path<(String, String, String)>,
) -> Result<Json<Value>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let project_id = parse_id(&project_id, "Error updating project")?;
    let device_id = parse_id(&device_id, "Error updating project")?;
    let claim = OwnerClaim::new(auth.user_id);

    let project = state
        .projects
        .append_device(&claim, project_id, user_id, device_id)
        .await?;
    Ok(Json(json!({ "project": project })))
}
