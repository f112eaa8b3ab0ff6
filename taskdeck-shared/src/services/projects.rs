/// Project lifecycle operations
///
/// Creating a project always creates the owner membership for the creator in
/// the same transaction; deleting one removes every dependent row in a fixed
/// order inside one transaction. A failure at any step rolls back the whole
/// operation, leaving the project and all its children untouched.
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::authorization::require_role;
use crate::error::{CoreError, CoreResult};
use crate::models::membership::{Membership, ProjectRole, TeamMember};
use crate::models::project::{CreateProject, Project, UpdateProject};

/// A project with its memberships eagerly loaded
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProjectWithMembers {
    #[serde(flatten)]
    pub project: Project,

    /// Members of the project, oldest first
    pub members: Vec<TeamMember>,
}

/// Creates a project and its owner membership atomically
///
/// The actor becomes the project's single `owner`; no other membership is
/// attached at creation.
///
/// # Errors
///
/// - `Validation` if `end_date` is not after `start_date`
/// - `Database` if the transaction fails (nothing is committed)
pub async fn create_project(
    pool: &PgPool,
    actor: Uuid,
    data: CreateProject,
) -> CoreResult<ProjectWithMembers> {
    if data.end_date <= data.start_date {
        return Err(CoreError::Validation(
            "end_date must be after start_date".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let project = Project::insert(&mut *tx, &data, actor).await?;
    Membership::attach(&mut *tx, project.id, actor, ProjectRole::Owner).await?;

    tx.commit().await?;

    info!(project_id = %project.id, owner = %actor, "project created");

    let members = Membership::list_members(pool, project.id).await?;

    Ok(ProjectWithMembers { project, members })
}

/// Loads a project with its members; requires membership
pub async fn get_project(
    pool: &PgPool,
    actor: Uuid,
    project_id: Uuid,
) -> CoreResult<ProjectWithMembers> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(CoreError::NotFound("project"))?;

    crate::auth::authorization::require_membership(pool, project_id, actor).await?;

    let members = Membership::list_members(pool, project_id).await?;

    Ok(ProjectWithMembers { project, members })
}

/// Lists the actor's projects, newest first
pub async fn list_projects(pool: &PgPool, actor: Uuid) -> CoreResult<Vec<Project>> {
    Ok(Project::list_for_member(pool, actor).await?)
}

/// Updates a project's fields; requires admin or owner
///
/// Date changes are validated against the effective pair, so updating only
/// one end cannot invert the range.
pub async fn update_project(
    pool: &PgPool,
    actor: Uuid,
    project_id: Uuid,
    changes: UpdateProject,
) -> CoreResult<Project> {
    let mut tx = pool.begin().await?;

    let current = Project::find_by_id(&mut *tx, project_id)
        .await?
        .ok_or(CoreError::NotFound("project"))?;

    require_role(&mut *tx, project_id, actor, ProjectRole::Admin).await?;

    let start = changes.start_date.unwrap_or(current.start_date);
    let end = changes.end_date.unwrap_or(current.end_date);
    if end <= start {
        return Err(CoreError::Validation(
            "end_date must be after start_date".to_string(),
        ));
    }

    let project = Project::update(&mut *tx, project_id, &changes)
        .await?
        .ok_or(CoreError::NotFound("project"))?;

    tx.commit().await?;

    Ok(project)
}

/// Deletes a project and everything it owns, atomically
///
/// Requires admin or owner on the project. The cascade runs as an ordered
/// sequence of steps in one transaction:
///
/// 1. comments of the project's tasks
/// 2. task assignments (cleared)
/// 3. tasks
/// 4. custom board columns
/// 5. memberships
/// 6. the project row
///
/// # Errors
///
/// - `NotFound` if the project no longer exists
/// - `Unauthorized` if the actor is below admin
/// - `Database` on any step failure; the whole cascade is rolled back
pub async fn delete_project(pool: &PgPool, actor: Uuid, project_id: Uuid) -> CoreResult<()> {
    let mut tx = pool.begin().await?;

    let project = Project::find_by_id(&mut *tx, project_id)
        .await?
        .ok_or(CoreError::NotFound("project"))?;

    require_role(&mut *tx, project_id, actor, ProjectRole::Admin).await?;

    crate::models::comment::Comment::delete_by_project(&mut *tx, project_id).await?;

    sqlx::query("UPDATE tasks SET assignee_id = NULL WHERE project_id = $1")
        .bind(project_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM tasks WHERE project_id = $1")
        .bind(project_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM board_columns WHERE project_id = $1")
        .bind(project_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM project_members WHERE project_id = $1")
        .bind(project_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(project_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(project_id = %project.id, actor = %actor, "project deleted with cascade");

    Ok(())
}
