/// Task lifecycle and comment endpoints
///
/// # Endpoints
///
/// - `GET    /v1/tasks` - List tasks across the caller's projects
/// - `POST   /v1/tasks` - Create a task
/// - `GET    /v1/tasks/:id` - Get a task with project and assignee context
/// - `PUT    /v1/tasks/:id` - Update a task
/// - `PATCH  /v1/tasks/:id/status` - Move a task to another column
/// - `DELETE /v1/tasks/:id` - Delete a task and its comments
/// - `GET    /v1/tasks/:id/comments` - List comments
/// - `POST   /v1/tasks/:id/comments` - Add a comment or reply
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
use taskdeck_shared::models::comment::Comment;
use taskdeck_shared::models::task::{TaskDetail, TaskPriority, UpdateTask};
use taskdeck_shared::services::tasks::{self, CreateTask};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Project the task belongs to
    pub project_id: Uuid,

    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Board column identifier; defaults to `todo`
    pub status: Option<String>,

    /// Priority; defaults to `medium`
    pub priority: Option<TaskPriority>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Assignee; must be a member of the project. Defaults to the caller
    pub assignee_id: Option<Uuid>,
}

/// Update task request; omitted fields are left untouched
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    /// Move the task to another project; caller must be a member of both
    pub project_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
}

/// Status transition request
#[derive(Debug, Deserialize, Validate)]
pub struct TransitionStatusRequest {
    /// Target column identifier
    #[validate(length(min = 1, max = 255, message = "Status must be 1-255 characters"))]
    pub status: String,
}

/// Add comment request
#[derive(Debug, Deserialize, Validate)]
pub struct AddCommentRequest {
    /// Comment text
    #[validate(length(min = 1, message = "Comment body must not be empty"))]
    pub body: String,

    /// Parent comment when replying; must belong to the same task
    pub parent_id: Option<Uuid>,
}

/// List tasks response
#[derive(Debug, Serialize)]
pub struct ListTasksResponse {
    /// Tasks across the caller's projects, newest first
    pub tasks: Vec<TaskDetail>,
}

/// List comments response
#[derive(Debug, Serialize)]
pub struct ListCommentsResponse {
    /// The task's comments, newest first
    pub comments: Vec<Comment>,
}

/// Delete task response
#[derive(Debug, Serialize)]
pub struct DeleteTaskResponse {
    /// Whether the task and its comments were removed
    pub deleted: bool,
}

/// List tasks across the caller's projects
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<ListTasksResponse>> {
    let tasks = tasks::list_tasks(&state.db, user.id).await?;

    Ok(Json(ListTasksResponse { tasks }))
}

/// Create a task
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a member of the project
/// - `422 Unprocessable Entity`: Invalid status or assignee
pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskDetail>)> {
    req.validate()?;

    let input = CreateTask {
        project_id: req.project_id,
        title: req.title,
        description: req.description,
        status: req.status,
        priority: req.priority,
        due_date: req.due_date,
        assignee_id: req.assignee_id,
    };

    let task = tasks::create_task(&state.db, user.id, input).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Get a task with project and assignee context
pub async fn get_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskDetail>> {
    let task = tasks::get_task(&state.db, user.id, id).await?;

    Ok(Json(task))
}

/// Update a task
///
/// Moving the task to another project requires membership on both; status
/// and assignee are validated against the project the task ends up in.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskDetail>> {
    req.validate()?;

    let changes = UpdateTask {
        title: req.title,
        description: req.description,
        status: req.status,
        priority: req.priority,
        due_date: req.due_date,
        project_id: req.project_id,
        assignee_id: req.assignee_id,
    };

    let task = tasks::update_task(&state.db, user.id, id, changes).await?;

    Ok(Json(task))
}

/// Move a task to another board column
///
/// # Errors
///
/// - `422 Unprocessable Entity`: The status is not a column of the task's
///   project
pub async fn transition_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<TransitionStatusRequest>,
) -> ApiResult<Json<TaskDetail>> {
    req.validate()?;

    let task = tasks::transition_status(&state.db, user.id, id, &req.status).await?;

    Ok(Json(task))
}

/// Delete a task and its comments
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteTaskResponse>> {
    tasks::delete_task(&state.db, user.id, id).await?;

    Ok(Json(DeleteTaskResponse { deleted: true }))
}

/// List a task's comments
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ListCommentsResponse>> {
    let comments = tasks::list_comments(&state.db, user.id, id).await?;

    Ok(Json(ListCommentsResponse { comments }))
}

/// Add a comment or reply to a task
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    req.validate()?;

    let comment = tasks::add_comment(&state.db, user.id, id, req.parent_id, &req.body).await?;

    Ok((StatusCode::CREATED, Json(comment)))
}
