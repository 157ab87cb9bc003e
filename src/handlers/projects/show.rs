use axum::{
    extract::{Extension, Path, State},
    response::Json,
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::OwnerClaim;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

use super::parse_user_id;

/// GET /projects/:userId - the caller's project with relations expanded.
/// Responds `{"project": null}` when the user owns no project.
pub async fn show(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let claim = OwnerClaim::new(auth.user_id);

    let project = state.projects.get_by_user(&claim, user_id).await?;
    Ok(Json(json!({ "project": project })))
}
