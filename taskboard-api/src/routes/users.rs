/// User administration endpoints
///
/// - `POST /api/users/:id/approve` - Approve a pending account (admin only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{auth::UserResponse, parse_id},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use taskboard_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    models::user::PublicUser,
};

/// Approve an account so it can log in
///
/// # Errors
///
/// - `400 Bad Request`: Non-numeric id
/// - `403 Forbidden`: Caller is not an admin
/// - `404 Not Found`: No such user
pub async fn approve_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    require_admin(&auth)?;
    let user_id = parse_id(&id, "user")?;

    let user = state
        .store
        .set_user_approval(user_id, true)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id, approved_by = auth.user_id, "Account approved");

    Ok(Json(UserResponse {
        message: "User approved".to_string(),
        user: PublicUser::from(user),
    }))
}
