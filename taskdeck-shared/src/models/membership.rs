/// Membership model and database operations
///
/// A membership is the (project, user, role) relation granting a user standing
/// on a project. Roles are ordered `owner > admin > member`; every "minimum
/// role required" check in the system compares against this ordering.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_role AS ENUM ('owner', 'admin', 'member');
///
/// CREATE TABLE project_members (
///     project_id UUID NOT NULL REFERENCES projects(id),
///     user_id UUID NOT NULL REFERENCES users(id),
///     role project_role NOT NULL DEFAULT 'member',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```
///
/// # Roles
///
/// - **owner**: set once at project creation for the creator; never assignable
///   through the roster
/// - **admin**: manage the team, delete the project
/// - **member**: create and move tasks
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Role a user holds on a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    /// The project creator; exactly one per project, set at creation
    Owner,

    /// Can manage the team and delete the project
    Admin,

    /// Can create and manage tasks
    Member,
}

impl ProjectRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::Owner => "owner",
            ProjectRole::Admin => "admin",
            ProjectRole::Member => "member",
        }
    }

    /// Checks whether this role meets the required minimum
    ///
    /// Hierarchy: Owner > Admin > Member.
    pub fn has_min(&self, required: ProjectRole) -> bool {
        self.rank() >= required.rank()
    }

    /// Whether this role may be assigned through the roster
    ///
    /// Only `member` and `admin` are assignable; `owner` exists solely as the
    /// creator's role.
    pub fn is_assignable(&self) -> bool {
        !matches!(self, ProjectRole::Owner)
    }

    fn rank(&self) -> u8 {
        match self {
            ProjectRole::Owner => 3,
            ProjectRole::Admin => 2,
            ProjectRole::Member => 1,
        }
    }
}

/// Membership row linking a user to a project with a role
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Project ID
    pub project_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the project
    pub role: ProjectRole,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

/// A project member joined with user identity, for team listings
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TeamMember {
    /// User ID
    pub id: Uuid,

    /// User display name
    pub name: String,

    /// User email
    pub email: String,

    /// Role on the project the row was read from
    pub role: ProjectRole,
}

impl Membership {
    /// Attaches a user to a project with a role
    ///
    /// # Errors
    ///
    /// Fails with a unique-constraint violation if the membership already
    /// exists, or a foreign-key violation if the project or user is missing.
    pub async fn attach<'e, E>(
        executor: E,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectRole,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO project_members (project_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING project_id, user_id, role, created_at
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(executor)
        .await?;

        Ok(membership)
    }

    /// Finds a specific membership by project and user
    pub async fn find<'e, E>(
        executor: E,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT project_id, user_id, role, created_at
            FROM project_members
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(membership)
    }

    /// Checks if a user belongs to a project (any role)
    pub async fn exists<'e, E>(
        executor: E,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM project_members
                WHERE project_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    /// Updates a user's role on a project
    ///
    /// Returns the updated membership, or `None` if no membership exists.
    pub async fn update_role<'e, E>(
        executor: E,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectRole,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            UPDATE project_members
            SET role = $3
            WHERE project_id = $1 AND user_id = $2
            RETURNING project_id, user_id, role, created_at
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(executor)
        .await?;

        Ok(membership)
    }

    /// Detaches a user from a project
    ///
    /// Returns true if a membership row was removed.
    pub async fn detach<'e, E>(
        executor: E,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result =
            sqlx::query("DELETE FROM project_members WHERE project_id = $1 AND user_id = $2")
                .bind(project_id)
                .bind(user_id)
                .execute(executor)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the members of a project with their user identities
    pub async fn list_members<'e, E>(
        executor: E,
        project_id: Uuid,
    ) -> Result<Vec<TeamMember>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let members = sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT u.id, u.name, u.email, pm.role
            FROM project_members pm
            JOIN users u ON u.id = pm.user_id
            WHERE pm.project_id = $1
            ORDER BY pm.created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(executor)
        .await?;

        Ok(members)
    }
}
