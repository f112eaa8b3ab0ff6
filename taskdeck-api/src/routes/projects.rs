/// Project lifecycle endpoints
///
/// # Endpoints
///
/// - `GET    /v1/projects` - List the caller's projects
/// - `POST   /v1/projects` - Create a project (caller becomes owner)
/// - `GET    /v1/projects/:id` - Get a project with its members
/// - `PUT    /v1/projects/:id` - Update a project (admin or owner)
/// - `DELETE /v1/projects/:id` - Delete a project and everything in it
///   (admin or owner)
use crate::{
    app::{AppState, CurrentUser},
    error::ApiResult,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use taskdeck_shared::models::project::{CreateProject, Project, ProjectStatus, UpdateProject};
use taskdeck_shared::services::projects::{self, ProjectWithMembers};
use uuid::Uuid;
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Scheduled start
    pub start_date: NaiveDate,

    /// Scheduled end; must be after `start_date`
    pub end_date: NaiveDate,

    /// Lifecycle status; defaults to `pending`
    pub status: Option<ProjectStatus>,
}

/// Update project request; omitted fields are left untouched
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<ProjectStatus>,
}

/// List projects response
#[derive(Debug, Serialize)]
pub struct ListProjectsResponse {
    /// The caller's projects, newest first
    pub projects: Vec<Project>,
}

/// Delete project response
#[derive(Debug, Serialize)]
pub struct DeleteProjectResponse {
    /// Whether the project and its contents were removed
    pub deleted: bool,
}

/// List the caller's projects
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<ListProjectsResponse>> {
    let projects = projects::list_projects(&state.db, user.id).await?;

    Ok(Json(ListProjectsResponse { projects }))
}

/// Create a project
///
/// The caller becomes the project's owner; the owner membership is written
/// in the same transaction as the project row.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed (e.g. end date not after
///   start date)
pub async fn create_project(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectWithMembers>)> {
    req.validate()?;

    let data = CreateProject {
        title: req.title,
        description: req.description,
        start_date: req.start_date,
        end_date: req.end_date,
        status: req.status.unwrap_or(ProjectStatus::Pending),
    };

    let project = projects::create_project(&state.db, user.id, data).await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// Get a project with its members
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a member
/// - `404 Not Found`: No such project
pub async fn get_project(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectWithMembers>> {
    let project = projects::get_project(&state.db, user.id, id).await?;

    Ok(Json(project))
}

/// Update a project
///
/// Requires admin or owner on the project.
pub async fn update_project(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate()?;

    let changes = UpdateProject {
        title: req.title,
        description: req.description,
        start_date: req.start_date,
        end_date: req.end_date,
        status: req.status,
    };

    let project = projects::update_project(&state.db, user.id, id, changes).await?;

    Ok(Json(project))
}

/// Delete a project and everything belonging to it
///
/// Removes comments, tasks, board columns, and memberships with the project
/// row in a single transaction. Requires admin or owner.
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteProjectResponse>> {
    projects::delete_project(&state.db, user.id, id).await?;

    Ok(Json(DeleteProjectResponse { deleted: true }))
}
