/// Roster endpoints
///
/// Two route families share this module: per-project operations under
/// `/v1/projects/:id/team` and fan-out operations under `/v1/team` that
/// apply across every project the caller administers.
///
/// # Endpoints
///
/// - `GET    /v1/projects/:id/team` - List a project's members
/// - `POST   /v1/projects/:id/team` - Invite a user by email
/// - `PUT    /v1/projects/:id/team/:user_id` - Change a member's role
/// - `DELETE /v1/projects/:id/team/:user_id` - Remove a member
/// - `GET    /v1/team` - Members across the caller's projects, deduplicated
/// - `POST   /v1/team` - Add a user to every administered project
/// - `PUT    /v1/team/:user_id` - Change a user's role everywhere
/// - `DELETE /v1/team/:user_id` - Remove a user from every administered project
use crate::{
    app::{AppState, CurrentUser},
    error::ApiResult,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskdeck_shared::models::membership::{Membership, ProjectRole, TeamMember};
use taskdeck_shared::services::roster::{self, FanoutReport};
use uuid::Uuid;
use validator::Validate;

/// Invite member request
#[derive(Debug, Deserialize, Validate)]
pub struct InviteMemberRequest {
    /// Email of the user to invite
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,

    /// Role to grant; `owner` is never assignable
    pub role: ProjectRole,
}

/// Update role request
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    /// New role; `owner` is never assignable
    pub role: ProjectRole,
}

/// Team listing response
#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub members: Vec<TeamMember>,
}

/// Remove member response
#[derive(Debug, Serialize)]
pub struct RemoveMemberResponse {
    /// Whether the membership was removed
    pub removed: bool,
}

/// List a project's members
pub async fn list_project_team(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<TeamResponse>> {
    let members = roster::list_project_team(&state.db, user.id, project_id).await?;

    Ok(Json(TeamResponse { members }))
}

/// Invite a user to a project by email
///
/// Requires admin or owner on the project.
///
/// # Errors
///
/// - `404 Not Found`: No user with that email
/// - `422 Unprocessable Entity`: Already a member, or role not assignable
pub async fn invite_member(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<InviteMemberRequest>,
) -> ApiResult<(StatusCode, Json<Membership>)> {
    req.validate()?;

    let membership = roster::invite(&state.db, user.id, project_id, &req.email, req.role).await?;

    Ok((StatusCode::CREATED, Json(membership)))
}

/// Change a member's role on a project
///
/// Requires admin or owner. The owner's role can never be changed.
pub async fn update_member_role(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((project_id, user_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateRoleRequest>,
) -> ApiResult<Json<Membership>> {
    let membership =
        roster::update_role(&state.db, user.id, project_id, user_id, req.role).await?;

    Ok(Json(membership))
}

/// Remove a member from a project
///
/// Requires admin or owner. Self-removal is rejected with `400`.
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((project_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<RemoveMemberResponse>> {
    roster::remove(&state.db, user.id, project_id, user_id).await?;

    Ok(Json(RemoveMemberResponse { removed: true }))
}

/// List members across the caller's projects
///
/// Each user appears once, annotated with the role from their oldest
/// membership.
pub async fn list_team(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<TeamResponse>> {
    let members = roster::list_team(&state.db, user.id).await?;

    Ok(Json(TeamResponse { members }))
}

/// Add a user to every project the caller administers
///
/// Returns a per-project report; projects where the user is already a
/// member are skipped, not failed.
///
/// # Errors
///
/// - `403 Forbidden`: The caller administers no project
pub async fn attach_everywhere(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<InviteMemberRequest>,
) -> ApiResult<(StatusCode, Json<FanoutReport>)> {
    req.validate()?;

    let report = roster::attach_everywhere(&state.db, user.id, &req.email, req.role).await?;

    Ok((StatusCode::CREATED, Json(report)))
}

/// Change a user's role on every administered project
///
/// Projects where the user is not a member, or is the owner, are skipped.
pub async fn update_role_everywhere(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateRoleRequest>,
) -> ApiResult<Json<FanoutReport>> {
    let report =
        roster::update_role_everywhere(&state.db, user.id, user_id, req.role).await?;

    Ok(Json(report))
}

/// Remove a user from every administered project
///
/// Self-removal is rejected with `400`.
pub async fn detach_everywhere(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<FanoutReport>> {
    let report = roster::detach_everywhere(&state.db, user.id, user_id).await?;

    Ok(Json(report))
}
