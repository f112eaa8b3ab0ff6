/// Project model and database operations
///
/// A project owns memberships, tasks, and custom board columns. Creation and
/// deletion are handled by `services::projects`, which wraps the row
/// operations here in the required transactions.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_status AS ENUM ('pending', 'in_progress', 'completed', 'cancelled');
///
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     start_date DATE NOT NULL,
///     end_date DATE NOT NULL,
///     status project_status NOT NULL DEFAULT 'pending',
///     created_by UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Project lifecycle status
///
/// Unlike task status this is a fixed enum: projects do not have
/// configurable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Not started yet
    Pending,

    /// Actively worked on
    InProgress,

    /// Finished
    Completed,

    /// Abandoned
    Cancelled,
}

impl ProjectStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => "pending",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }
}

/// Project row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Project title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Scheduled start
    pub start_date: NaiveDate,

    /// Scheduled end; always after `start_date`
    pub end_date: NaiveDate,

    /// Lifecycle status
    pub status: ProjectStatus,

    /// The user who created the project (its owner)
    pub created_by: Uuid,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Project title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Scheduled start
    pub start_date: NaiveDate,

    /// Scheduled end
    pub end_date: NaiveDate,

    /// Lifecycle status
    pub status: ProjectStatus,
}

/// Partial update for a project; `None` fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<ProjectStatus>,
}

const PROJECT_COLUMNS: &str =
    "id, title, description, start_date, end_date, status, created_by, created_at, updated_at";

impl Project {
    /// Inserts a project row
    ///
    /// Callers are expected to create the owner membership in the same
    /// transaction; use `services::projects::create_project`.
    pub async fn insert<'e, E>(
        executor: E,
        data: &CreateProject,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (title, description, start_date, end_date, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PROJECT_COLUMNS}
            "#,
        ))
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.status)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(project)
    }

    /// Lists projects where the user holds a membership, newest first
    pub async fn list_for_member<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let projects = sqlx::query_as::<_, Project>(&format!(
            r#"
            SELECT p.{}
            FROM projects p
            JOIN project_members pm ON pm.project_id = p.id
            WHERE pm.user_id = $1
            ORDER BY p.created_at DESC
            "#,
            PROJECT_COLUMNS.replace(", ", ", p."),
        ))
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(projects)
    }

    /// Lists projects where the user holds at least an admin role
    ///
    /// This is the qualifying set for roster fan-out operations.
    pub async fn list_where_admin<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let projects = sqlx::query_as::<_, Project>(&format!(
            r#"
            SELECT p.{}
            FROM projects p
            JOIN project_members pm ON pm.project_id = p.id
            WHERE pm.user_id = $1 AND pm.role IN ('owner', 'admin')
            ORDER BY p.created_at ASC
            "#,
            PROJECT_COLUMNS.replace(", ", ", p."),
        ))
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(projects)
    }

    /// Applies a partial update to a project row
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        changes: &UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            UPDATE projects
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                start_date = COALESCE($4, start_date),
                end_date = COALESCE($5, end_date),
                status = COALESCE($6, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PROJECT_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.start_date)
        .bind(changes.end_date)
        .bind(changes.status)
        .fetch_optional(executor)
        .await?;

        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_status_as_str() {
        assert_eq!(ProjectStatus::Pending.as_str(), "pending");
        assert_eq!(ProjectStatus::InProgress.as_str(), "in_progress");
        assert_eq!(ProjectStatus::Completed.as_str(), "completed");
        assert_eq!(ProjectStatus::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn test_project_status_serde_names() {
        let json = serde_json::to_string(&ProjectStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let status: ProjectStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, ProjectStatus::Cancelled);
    }
}
