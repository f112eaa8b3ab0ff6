/// Team roster operations
///
/// Two shapes of mutation: per-project (invite, remove, re-role one member
/// of one project) and fan-out (apply the same mutation across every project
/// where the actor holds admin or owner). Fan-outs run in a single
/// transaction and return an explicit per-project report instead of failing
/// on the first project that does not apply.
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::authorization::{require_membership, require_role};
use crate::error::{CoreError, CoreResult};
use crate::models::membership::{Membership, ProjectRole, TeamMember};
use crate::models::project::Project;
use crate::models::user::User;

/// Whether a fan-out mutation applied to a given project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// The mutation ran on this project
    Applied,

    /// The project did not qualify (already a member, or no membership to
    /// touch); not an error
    Skipped,
}

/// One project's outcome within a fan-out report
#[derive(Debug, Clone, Serialize)]
pub struct ProjectOutcome {
    pub project_id: Uuid,
    pub title: String,
    pub status: OutcomeStatus,
}

/// Per-project report of a fan-out mutation
#[derive(Debug, Clone, Serialize)]
pub struct FanoutReport {
    pub outcomes: Vec<ProjectOutcome>,
}

impl FanoutReport {
    /// Titles of the projects the mutation actually ran on
    pub fn affected_titles(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Applied)
            .map(|o| o.title.as_str())
            .collect()
    }

    /// Number of projects the mutation actually ran on
    pub fn applied_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Applied)
            .count()
    }
}

fn ensure_assignable(role: ProjectRole) -> CoreResult<()> {
    if !role.is_assignable() {
        return Err(CoreError::Validation(format!(
            "role '{}' cannot be assigned",
            role.as_str()
        )));
    }
    Ok(())
}

/// Invites a user to a project by email
///
/// Requires admin or owner on the project.
///
/// # Errors
///
/// - `Validation` if the role is not assignable (`owner` never is)
/// - `NotFound` if no user has that email
/// - `AlreadyMember` if the user already belongs to the project
pub async fn invite(
    pool: &PgPool,
    actor: Uuid,
    project_id: Uuid,
    email: &str,
    role: ProjectRole,
) -> CoreResult<Membership> {
    ensure_assignable(role)?;

    let mut tx = pool.begin().await?;

    Project::find_by_id(&mut *tx, project_id)
        .await?
        .ok_or(CoreError::NotFound("project"))?;

    require_role(&mut *tx, project_id, actor, ProjectRole::Admin).await?;

    let user = User::find_by_email(&mut *tx, email)
        .await?
        .ok_or(CoreError::NotFound("user"))?;

    if Membership::exists(&mut *tx, project_id, user.id).await? {
        return Err(CoreError::AlreadyMember);
    }

    let membership = Membership::attach(&mut *tx, project_id, user.id, role).await?;

    tx.commit().await?;

    info!(
        project_id = %project_id,
        user_id = %user.id,
        role = %role.as_str(),
        "member invited"
    );

    Ok(membership)
}

/// Removes a member from a project
///
/// Requires admin or owner. Actors can never remove themselves; leaving a
/// project is not a roster operation.
pub async fn remove(pool: &PgPool, actor: Uuid, project_id: Uuid, user_id: Uuid) -> CoreResult<()> {
    if actor == user_id {
        return Err(CoreError::SelfRemovalForbidden);
    }

    let mut tx = pool.begin().await?;

    Project::find_by_id(&mut *tx, project_id)
        .await?
        .ok_or(CoreError::NotFound("project"))?;

    require_role(&mut *tx, project_id, actor, ProjectRole::Admin).await?;

    if !Membership::detach(&mut *tx, project_id, user_id).await? {
        return Err(CoreError::NotProjectMember);
    }

    tx.commit().await?;

    info!(project_id = %project_id, user_id = %user_id, "member removed");

    Ok(())
}

/// Changes a member's role on a project
///
/// Requires admin or owner. The owner's role is fixed at creation and can
/// never be changed here.
pub async fn update_role(
    pool: &PgPool,
    actor: Uuid,
    project_id: Uuid,
    user_id: Uuid,
    role: ProjectRole,
) -> CoreResult<Membership> {
    ensure_assignable(role)?;

    let mut tx = pool.begin().await?;

    Project::find_by_id(&mut *tx, project_id)
        .await?
        .ok_or(CoreError::NotFound("project"))?;

    require_role(&mut *tx, project_id, actor, ProjectRole::Admin).await?;

    let current = Membership::find(&mut *tx, project_id, user_id)
        .await?
        .ok_or(CoreError::NotProjectMember)?;

    if current.role == ProjectRole::Owner {
        return Err(CoreError::Validation(
            "the project owner's role cannot be changed".to_string(),
        ));
    }

    let membership = Membership::update_role(&mut *tx, project_id, user_id, role)
        .await?
        .ok_or(CoreError::NotProjectMember)?;

    tx.commit().await?;

    info!(
        project_id = %project_id,
        user_id = %user_id,
        role = %role.as_str(),
        "member role updated"
    );

    Ok(membership)
}

/// Adds a user to every project the actor administers
///
/// Idempotent per project: existing memberships are reported as `Skipped`,
/// never as errors. Runs in one transaction.
///
/// # Errors
///
/// `Unauthorized` if the actor administers no project at all.
pub async fn attach_everywhere(
    pool: &PgPool,
    actor: Uuid,
    email: &str,
    role: ProjectRole,
) -> CoreResult<FanoutReport> {
    ensure_assignable(role)?;

    let mut tx = pool.begin().await?;

    let user = User::find_by_email(&mut *tx, email)
        .await?
        .ok_or(CoreError::NotFound("user"))?;

    let projects = Project::list_where_admin(&mut *tx, actor).await?;
    if projects.is_empty() {
        return Err(CoreError::Unauthorized(
            "no projects administered by this user".to_string(),
        ));
    }

    let mut outcomes = Vec::with_capacity(projects.len());
    for project in projects {
        let status = if Membership::exists(&mut *tx, project.id, user.id).await? {
            OutcomeStatus::Skipped
        } else {
            Membership::attach(&mut *tx, project.id, user.id, role).await?;
            OutcomeStatus::Applied
        };
        outcomes.push(ProjectOutcome {
            project_id: project.id,
            title: project.title,
            status,
        });
    }

    tx.commit().await?;

    let report = FanoutReport { outcomes };
    info!(
        user_id = %user.id,
        applied = report.applied_count(),
        "member attached across projects"
    );

    Ok(report)
}

/// Removes a user from every project the actor administers
///
/// Projects where the user holds no membership are `Skipped`. Runs in one
/// transaction.
pub async fn detach_everywhere(pool: &PgPool, actor: Uuid, user_id: Uuid) -> CoreResult<FanoutReport> {
    if actor == user_id {
        return Err(CoreError::SelfRemovalForbidden);
    }

    let mut tx = pool.begin().await?;

    let projects = Project::list_where_admin(&mut *tx, actor).await?;
    if projects.is_empty() {
        return Err(CoreError::Unauthorized(
            "no projects administered by this user".to_string(),
        ));
    }

    let mut outcomes = Vec::with_capacity(projects.len());
    for project in projects {
        let status = if Membership::detach(&mut *tx, project.id, user_id).await? {
            OutcomeStatus::Applied
        } else {
            OutcomeStatus::Skipped
        };
        outcomes.push(ProjectOutcome {
            project_id: project.id,
            title: project.title,
            status,
        });
    }

    tx.commit().await?;

    let report = FanoutReport { outcomes };
    info!(
        user_id = %user_id,
        applied = report.applied_count(),
        "member detached across projects"
    );

    Ok(report)
}

/// Changes a user's role on every project the actor administers
///
/// Projects where the user holds no membership, and projects where the
/// user is the owner, are `Skipped`. Runs in one transaction.
pub async fn update_role_everywhere(
    pool: &PgPool,
    actor: Uuid,
    user_id: Uuid,
    role: ProjectRole,
) -> CoreResult<FanoutReport> {
    ensure_assignable(role)?;

    let mut tx = pool.begin().await?;

    let projects = Project::list_where_admin(&mut *tx, actor).await?;
    if projects.is_empty() {
        return Err(CoreError::Unauthorized(
            "no projects administered by this user".to_string(),
        ));
    }

    let mut outcomes = Vec::with_capacity(projects.len());
    for project in projects {
        let status = match Membership::find(&mut *tx, project.id, user_id).await? {
            Some(m) if m.role != ProjectRole::Owner => {
                Membership::update_role(&mut *tx, project.id, user_id, role).await?;
                OutcomeStatus::Applied
            }
            _ => OutcomeStatus::Skipped,
        };
        outcomes.push(ProjectOutcome {
            project_id: project.id,
            title: project.title,
            status,
        });
    }

    tx.commit().await?;

    let report = FanoutReport { outcomes };
    info!(
        user_id = %user_id,
        role = %role.as_str(),
        applied = report.applied_count(),
        "member role updated across projects"
    );

    Ok(report)
}

/// Lists the members of a single project
///
/// Requires membership on the project.
pub async fn list_project_team(
    pool: &PgPool,
    actor: Uuid,
    project_id: Uuid,
) -> CoreResult<Vec<TeamMember>> {
    Project::find_by_id(pool, project_id)
        .await?
        .ok_or(CoreError::NotFound("project"))?;

    require_membership(pool, project_id, actor).await?;

    Ok(Membership::list_members(pool, project_id).await?)
}

/// Lists every member across the actor's projects, one row per user
///
/// A user who belongs to several of the actor's projects appears once,
/// annotated with the role from their oldest membership.
pub async fn list_team(pool: &PgPool, actor: Uuid) -> CoreResult<Vec<TeamMember>> {
    let members = sqlx::query_as::<_, TeamMember>(
        r#"
        SELECT DISTINCT ON (u.id) u.id, u.name, u.email, pm.role
        FROM project_members pm
        JOIN users u ON u.id = pm.user_id
        WHERE pm.project_id IN (
            SELECT project_id FROM project_members WHERE user_id = $1
        )
        ORDER BY u.id, pm.created_at ASC
        "#,
    )
    .bind(actor)
    .fetch_all(pool)
    .await?;

    Ok(members)
}
