/// Board column endpoints
///
/// The board is the per-project status registry: three fixed columns plus
/// custom ones. Identifiers are derived from titles server-side; clients
/// never choose them.
///
/// # Endpoints
///
/// - `GET    /v1/projects/:id/board` - List columns, fixed first
/// - `POST   /v1/projects/:id/board` - Add a custom column
/// - `PUT    /v1/projects/:id/board/:identifier` - Rename or reposition
/// - `DELETE /v1/projects/:id/board/:identifier` - Delete a custom column
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
use taskdeck_shared::models::board_column::BoardColumn;
use taskdeck_shared::services::board;
use uuid::Uuid;
use validator::Validate;

/// Create column request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateColumnRequest {
    /// Column title; the identifier is derived from it
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
}

/// Update column request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateColumnRequest {
    /// New display title; the identifier never changes
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New board position among custom columns
    pub position: Option<i32>,
}

/// List columns response
#[derive(Debug, Serialize)]
pub struct ListColumnsResponse {
    /// Fixed columns first, then custom columns by position
    pub columns: Vec<BoardColumn>,
}

/// Delete column response
#[derive(Debug, Serialize)]
pub struct DeleteColumnResponse {
    /// Whether the column was removed
    pub deleted: bool,
}

/// List a project's board columns
pub async fn list_columns(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<ListColumnsResponse>> {
    let columns = board::list_columns(&state.db, user.id, project_id).await?;

    Ok(Json(ListColumnsResponse { columns }))
}

/// Add a custom column
///
/// # Errors
///
/// - `422 Unprocessable Entity`: The derived identifier collides with a
///   fixed or existing column
pub async fn create_column(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateColumnRequest>,
) -> ApiResult<(StatusCode, Json<BoardColumn>)> {
    req.validate()?;

    let column = board::create_column(&state.db, user.id, project_id, &req.title).await?;

    Ok((StatusCode::CREATED, Json(column)))
}

/// Rename or reposition a custom column
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Fixed column, or the target position is
///   already taken
/// - `404 Not Found`: No custom column with that identifier
pub async fn update_column(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((project_id, identifier)): Path<(Uuid, String)>,
    Json(req): Json<UpdateColumnRequest>,
) -> ApiResult<Json<BoardColumn>> {
    req.validate()?;

    let column = board::update_column(
        &state.db,
        user.id,
        project_id,
        &identifier,
        req.title.as_deref(),
        req.position,
    )
    .await?;

    Ok(Json(column))
}

/// Delete a custom column
///
/// Tasks still in the column are moved back to `todo` in the same
/// transaction.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: The identifier names a fixed column
/// - `404 Not Found`: No custom column with that identifier
pub async fn delete_column(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((project_id, identifier)): Path<(Uuid, String)>,
) -> ApiResult<Json<DeleteColumnResponse>> {
    board::delete_column(&state.db, user.id, project_id, &identifier).await?;

    Ok(Json(DeleteColumnResponse { deleted: true }))
}
