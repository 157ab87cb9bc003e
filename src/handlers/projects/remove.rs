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

/// DELETE /projects/device/:deviceId/:projectId/:userId - pull the device
/// id from the project's device list and return the updated project. The
/// device document itself is left in place.
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((device_id, project_id, user_id)): Path<(String, String, String)>,
) -> Result<Json<Value>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let device_id = parse_id(&device_id, "Error removing device from project")?;
    let project_id = parse_id(&project_id, "Error removing device from project")?;
    let claim = OwnerClaim::new(auth.user_id);

    let project = state
        .projects
        .remove_device(&claim, device_id, project_id, user_id)
        .await?;
    Ok(Json(json!(project)))
}
