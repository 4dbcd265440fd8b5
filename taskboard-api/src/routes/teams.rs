/// Team endpoints
///
/// - `GET /api/teams/:id/details` - Team with lead, members and projects
/// - `DELETE /api/teams/:id/cascade` - Delete a team and everything under it (admin only)
///
/// # Cascade
///
/// ```text
/// authorize (401 / 403)
///   -> parse id (400)
///   -> locate team (404)
///   -> delete tasks, projects, members, team in one transaction
///   -> commit, or roll back and answer 500
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::parse_id,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    store::TeamDetails,
};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeResponse {
    pub message: String,
    pub deleted_projects: u64,
}

/// Get a team with its lead, members and projects
///
/// Members are ordered by join date, projects by last update (newest first).
pub async fn team_details(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<TeamDetails>> {
    let team_id = parse_id(&id, "team")?;

    let details = state
        .store
        .team_details(team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    Ok(Json(details))
}

/// Delete a team with its projects, their tasks and its memberships
///
/// All or nothing: on any failure the transaction is rolled back and the
/// caller gets a generic 500.
///
/// # Errors
///
/// - `400 Bad Request`: Non-numeric id
/// - `401 Unauthorized`: Missing or invalid token (auth layer)
/// - `403 Forbidden`: Caller is not an admin
/// - `404 Not Found`: No such team
/// - `500 Internal Server Error`: A deletion step failed
pub async fn delete_team_cascade(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<CascadeResponse>> {
    require_admin(&auth)?;
    let team_id = parse_id(&id, "team")?;

    let outcome = state
        .store
        .delete_team_cascade(team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    tracing::info!(
        team_id,
        deleted_by = auth.user_id,
        deleted_projects = outcome.deleted_projects,
        deleted_tasks = outcome.deleted_tasks,
        deleted_members = outcome.deleted_members,
        "Team deleted"
    );

    Ok(Json(CascadeResponse {
        message: "Team and all related data deleted successfully".to_string(),
        deleted_projects: outcome.deleted_projects,
    }))
}
