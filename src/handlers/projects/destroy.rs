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

/// DELETE /projects/:deviceId/:userId - delete the device document itself.
/// Responds with the deleted document, or null when nothing matched. The
/// owning project's device list is not touched.
pub async fn destroy(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((device_id, user_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let device_id = parse_id(&device_id, "Error deleting device")?;
    let claim = OwnerClaim::new(auth.user_id);

    let device = state
        .projects
        .delete_device(&claim, device_id, user_id)
        .await?;
    Ok(Json(json!(device)))
}
