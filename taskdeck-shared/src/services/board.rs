/// The board column registry
///
/// Owns the set of valid task-status identifiers for a project: the three
/// fixed columns plus any custom columns. Task status validation goes
/// through [`is_valid_status`]; nothing else decides what a legal status is.
use sqlx::{PgExecutor, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::auth::authorization::require_membership;
use crate::error::{CoreError, CoreResult};
use crate::models::board_column::{
    is_fixed_identifier, slugify, BoardColumn, ColumnRow, FIXED_COLUMNS,
};
use crate::models::project::Project;
use crate::models::task::Task;

/// Checks whether an identifier is a valid status for the project
///
/// Valid statuses are the fixed identifiers plus the project's custom
/// column identifiers.
pub async fn is_valid_status<'e, E>(
    executor: E,
    project_id: Uuid,
    identifier: &str,
) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    if is_fixed_identifier(identifier) {
        return Ok(true);
    }

    ColumnRow::identifier_exists(executor, project_id, identifier).await
}

/// Lists a project's columns: fixed first, then custom by position
///
/// Requires membership on the project.
pub async fn list_columns(
    pool: &PgPool,
    actor: Uuid,
    project_id: Uuid,
) -> CoreResult<Vec<BoardColumn>> {
    Project::find_by_id(pool, project_id)
        .await?
        .ok_or(CoreError::NotFound("project"))?;

    require_membership(pool, project_id, actor).await?;

    let mut columns = BoardColumn::fixed();
    let custom = ColumnRow::list_by_project(pool, project_id).await?;
    columns.extend(custom.into_iter().map(BoardColumn::from));

    Ok(columns)
}

/// Creates a custom column from a title
///
/// The identifier is the slugified title. Positions share one space with
/// the fixed columns (which occupy 0 through 2), so the first custom column
/// lands at 3 and later ones at one past the current maximum, computed and
/// inserted in the same transaction.
///
/// # Errors
///
/// - `Validation` for an empty title
/// - `DuplicateIdentifier` if the identifier collides with a fixed or
///   custom column of the project
pub async fn create_column(
    pool: &PgPool,
    actor: Uuid,
    project_id: Uuid,
    title: &str,
) -> CoreResult<BoardColumn> {
    let identifier = slugify(title);
    if identifier.is_empty() {
        return Err(CoreError::Validation(
            "column title must not be empty".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    Project::find_by_id(&mut *tx, project_id)
        .await?
        .ok_or(CoreError::NotFound("project"))?;

    require_membership(&mut *tx, project_id, actor).await?;

    if is_fixed_identifier(&identifier)
        || ColumnRow::identifier_exists(&mut *tx, project_id, &identifier).await?
    {
        return Err(CoreError::DuplicateIdentifier(identifier));
    }

    let base = ColumnRow::max_position(&mut *tx, project_id)
        .await?
        .max(FIXED_COLUMNS.len() as i32 - 1);
    let position = base + 1;
    let row = ColumnRow::insert(&mut *tx, project_id, &identifier, title.trim(), position).await?;

    tx.commit().await?;

    info!(project_id = %project_id, identifier = %row.identifier, "board column created");

    Ok(BoardColumn::from(row))
}

/// Updates a custom column's title and/or position
///
/// # Errors
///
/// - `Validation` if the identifier names a fixed column (those are not rows
///   and cannot be edited)
/// - `NotFound` if no custom column matches
/// - `Validation` if the requested position falls inside the fixed block
///   (0 through 2)
/// - `Conflict` if the requested position is already taken; positions are
///   never renumbered implicitly
pub async fn update_column(
    pool: &PgPool,
    actor: Uuid,
    project_id: Uuid,
    identifier: &str,
    title: Option<&str>,
    position: Option<i32>,
) -> CoreResult<BoardColumn> {
    if is_fixed_identifier(identifier) {
        return Err(CoreError::Validation(format!(
            "fixed column '{identifier}' cannot be updated"
        )));
    }

    let mut tx = pool.begin().await?;

    Project::find_by_id(&mut *tx, project_id)
        .await?
        .ok_or(CoreError::NotFound("project"))?;

    require_membership(&mut *tx, project_id, actor).await?;

    let row = ColumnRow::find_by_identifier(&mut *tx, project_id, identifier)
        .await?
        .ok_or(CoreError::NotFound("column"))?;

    if let Some(new_position) = position {
        if new_position < FIXED_COLUMNS.len() as i32 {
            return Err(CoreError::Validation(format!(
                "positions 0 through {} belong to the fixed columns",
                FIXED_COLUMNS.len() - 1
            )));
        }
        if new_position != row.position {
            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM board_columns WHERE project_id = $1 AND position = $2)",
            )
            .bind(project_id)
            .bind(new_position)
            .fetch_one(&mut *tx)
            .await?;

            if taken {
                return Err(CoreError::Conflict(format!(
                    "position {new_position} is already taken"
                )));
            }
        }
    }

    let updated = ColumnRow::update(&mut *tx, row.id, title.map(str::trim), position)
        .await?
        .ok_or(CoreError::NotFound("column"))?;

    tx.commit().await?;

    Ok(BoardColumn::from(updated))
}

/// Deletes a custom column
///
/// Tasks still sitting in the column are moved back to `todo` inside the
/// deleting transaction, so no task is ever left with a dangling status.
///
/// # Errors
///
/// - `ProtectedColumn` for any fixed identifier, regardless of actor role
/// - `NotFound` if no custom column matches
pub async fn delete_column(
    pool: &PgPool,
    actor: Uuid,
    project_id: Uuid,
    identifier: &str,
) -> CoreResult<()> {
    if is_fixed_identifier(identifier) {
        return Err(CoreError::ProtectedColumn(identifier.to_string()));
    }

    let mut tx = pool.begin().await?;

    Project::find_by_id(&mut *tx, project_id)
        .await?
        .ok_or(CoreError::NotFound("project"))?;

    require_membership(&mut *tx, project_id, actor).await?;

    let row = ColumnRow::find_by_identifier(&mut *tx, project_id, identifier)
        .await?
        .ok_or(CoreError::NotFound("column"))?;

    let moved = Task::reassign_status(&mut *tx, project_id, identifier, "todo").await?;
    ColumnRow::delete(&mut *tx, row.id).await?;

    tx.commit().await?;

    info!(
        project_id = %project_id,
        identifier = %identifier,
        tasks_moved = moved,
        "board column deleted"
    );

    Ok(())
}
