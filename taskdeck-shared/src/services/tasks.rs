/// Task lifecycle operations
///
/// Every operation here runs its membership check and its validation against
/// the column registry inside the same transaction as the write, so a column
/// deleted or a member removed concurrently can never slip a task into an
/// invalid state.
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::authorization::require_membership;
use crate::error::{CoreError, CoreResult};
use crate::models::comment::Comment;
use crate::models::membership::Membership;
use crate::models::project::Project;
use crate::models::task::{Task, TaskDetail, TaskPriority, UpdateTask};
use crate::services::board::is_valid_status;

/// Input for creating a task
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Board column identifier; defaults to `todo`
    pub status: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<chrono::NaiveDate>,
    /// Defaults to the creator when not given
    pub assignee_id: Option<Uuid>,
}

/// Creates a task in a project the actor belongs to
///
/// # Errors
///
/// - `Validation` for an empty title
/// - `InvalidColumn` if the status is not in the project's column registry
/// - `InvalidAssignee` if the assignee is not a member of the project
pub async fn create_task(pool: &PgPool, actor: Uuid, input: CreateTask) -> CoreResult<TaskDetail> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(CoreError::Validation(
            "task title must not be empty".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    Project::find_by_id(&mut *tx, input.project_id)
        .await?
        .ok_or(CoreError::NotFound("project"))?;

    require_membership(&mut *tx, input.project_id, actor).await?;

    let status = input.status.as_deref().unwrap_or("todo");
    if !is_valid_status(&mut *tx, input.project_id, status).await? {
        return Err(CoreError::InvalidColumn(status.to_string()));
    }

    let assignee = input.assignee_id.unwrap_or(actor);
    if !Membership::exists(&mut *tx, input.project_id, assignee).await? {
        return Err(CoreError::InvalidAssignee);
    }

    let task = Task::insert(
        &mut *tx,
        input.project_id,
        title,
        input.description.as_deref(),
        status,
        input.priority.unwrap_or(TaskPriority::Medium),
        input.due_date,
        assignee,
        actor,
    )
    .await?;

    tx.commit().await?;

    info!(task_id = %task.id, project_id = %task.project_id, "task created");

    Task::find_detail(pool, task.id)
        .await?
        .ok_or(CoreError::NotFound("task"))
}

/// Fetches a task with project and assignee context
///
/// Requires membership on the task's project.
pub async fn get_task(pool: &PgPool, actor: Uuid, task_id: Uuid) -> CoreResult<TaskDetail> {
    let detail = Task::find_detail(pool, task_id)
        .await?
        .ok_or(CoreError::NotFound("task"))?;

    require_membership(pool, detail.task.project_id, actor).await?;

    Ok(detail)
}

/// Lists the tasks of every project the actor belongs to, newest first
pub async fn list_tasks(pool: &PgPool, actor: Uuid) -> CoreResult<Vec<TaskDetail>> {
    Ok(Task::list_for_member(pool, actor).await?)
}

/// Applies a partial update to a task
///
/// Moving a task to another project requires membership on both projects;
/// the status and assignee are validated against the project the task ends
/// up in, not the one it came from.
pub async fn update_task(
    pool: &PgPool,
    actor: Uuid,
    task_id: Uuid,
    changes: UpdateTask,
) -> CoreResult<TaskDetail> {
    if let Some(title) = changes.title.as_deref() {
        if title.trim().is_empty() {
            return Err(CoreError::Validation(
                "task title must not be empty".to_string(),
            ));
        }
    }

    let mut tx = pool.begin().await?;

    let task = Task::find_by_id(&mut *tx, task_id)
        .await?
        .ok_or(CoreError::NotFound("task"))?;

    require_membership(&mut *tx, task.project_id, actor).await?;

    let target_project = changes.project_id.unwrap_or(task.project_id);
    if target_project != task.project_id {
        Project::find_by_id(&mut *tx, target_project)
            .await?
            .ok_or(CoreError::NotFound("project"))?;
        require_membership(&mut *tx, target_project, actor).await?;
    }

    let effective_status = changes.status.as_deref().unwrap_or(&task.status);
    if !is_valid_status(&mut *tx, target_project, effective_status).await? {
        return Err(CoreError::InvalidColumn(effective_status.to_string()));
    }

    let effective_assignee = changes.assignee_id.or(task.assignee_id);
    if let Some(assignee) = effective_assignee {
        if !Membership::exists(&mut *tx, target_project, assignee).await? {
            return Err(CoreError::InvalidAssignee);
        }
    }

    let updated = Task::update(&mut *tx, task_id, &changes)
        .await?
        .ok_or(CoreError::NotFound("task"))?;

    tx.commit().await?;

    Task::find_detail(pool, updated.id)
        .await?
        .ok_or(CoreError::NotFound("task"))
}

/// Moves a task to another board column
///
/// # Errors
///
/// `InvalidColumn` if the status is not in the project's column registry.
pub async fn transition_status(
    pool: &PgPool,
    actor: Uuid,
    task_id: Uuid,
    status: &str,
) -> CoreResult<TaskDetail> {
    let mut tx = pool.begin().await?;

    let task = Task::find_by_id(&mut *tx, task_id)
        .await?
        .ok_or(CoreError::NotFound("task"))?;

    require_membership(&mut *tx, task.project_id, actor).await?;

    if !is_valid_status(&mut *tx, task.project_id, status).await? {
        return Err(CoreError::InvalidColumn(status.to_string()));
    }

    let updated = Task::set_status(&mut *tx, task_id, status)
        .await?
        .ok_or(CoreError::NotFound("task"))?;

    tx.commit().await?;

    info!(task_id = %task_id, status = %status, "task moved");

    Task::find_detail(pool, updated.id)
        .await?
        .ok_or(CoreError::NotFound("task"))
}

/// Deletes a task and its comments in one transaction
pub async fn delete_task(pool: &PgPool, actor: Uuid, task_id: Uuid) -> CoreResult<()> {
    let mut tx = pool.begin().await?;

    let task = Task::find_by_id(&mut *tx, task_id)
        .await?
        .ok_or(CoreError::NotFound("task"))?;

    require_membership(&mut *tx, task.project_id, actor).await?;

    Comment::delete_by_task(&mut *tx, task_id).await?;
    Task::delete(&mut *tx, task_id).await?;

    tx.commit().await?;

    info!(task_id = %task_id, project_id = %task.project_id, "task deleted");

    Ok(())
}

/// Adds a comment to a task, optionally as a reply
///
/// # Errors
///
/// - `Validation` for an empty body, or a parent comment that belongs to a
///   different task
pub async fn add_comment(
    pool: &PgPool,
    actor: Uuid,
    task_id: Uuid,
    parent_id: Option<Uuid>,
    body: &str,
) -> CoreResult<Comment> {
    let body = body.trim();
    if body.is_empty() {
        return Err(CoreError::Validation(
            "comment body must not be empty".to_string(),
        ));
    }

    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or(CoreError::NotFound("task"))?;

    require_membership(pool, task.project_id, actor).await?;

    if let Some(parent) = parent_id {
        let parent_task: Option<Uuid> =
            sqlx::query_scalar("SELECT task_id FROM comments WHERE id = $1")
                .bind(parent)
                .fetch_optional(pool)
                .await?;

        match parent_task {
            Some(id) if id == task_id => {}
            Some(_) => {
                return Err(CoreError::Validation(
                    "parent comment belongs to a different task".to_string(),
                ))
            }
            None => return Err(CoreError::NotFound("comment")),
        }
    }

    Ok(Comment::create(pool, task_id, actor, parent_id, body).await?)
}

/// Lists a task's comments, newest first
pub async fn list_comments(pool: &PgPool, actor: Uuid, task_id: Uuid) -> CoreResult<Vec<Comment>> {
    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or(CoreError::NotFound("task"))?;

    require_membership(pool, task.project_id, actor).await?;

    Ok(Comment::list_by_task(pool, task_id).await?)
}
