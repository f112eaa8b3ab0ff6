/// Task model and database operations
///
/// Tasks belong to a project, carry a priority and an optional due date, and
/// move between board columns. `status` is deliberately a string, not an
/// enum: its valid values are the project's board column identifiers, which
/// users can extend at runtime. Validation happens in `services::tasks`
/// against the column registry.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status VARCHAR(255) NOT NULL DEFAULT 'todo',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     due_date DATE,
///     assignee_id UUID REFERENCES users(id),
///     created_by UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Converts priority to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Task row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Project the task belongs to
    pub project_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Board column identifier; always valid for the task's project
    pub status: String,

    /// Priority
    pub priority: TaskPriority,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Assigned member, if any; always a member of the same project
    pub assignee_id: Option<Uuid>,

    /// The user who created the task
    pub created_by: Uuid,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// A task with its project title and assignee identity resolved
///
/// This is the shape returned by task operations; the HTTP layer serializes
/// it directly.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TaskDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub task: Task,

    /// Title of the owning project
    pub project_title: String,

    /// Display name of the assignee, if any
    pub assignee_name: Option<String>,
}

/// Partial update for a task; `None` fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub project_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
}

const TASK_COLUMNS: &str = "id, project_id, title, description, status, priority, due_date, \
                            assignee_id, created_by, created_at, updated_at";

impl Task {
    /// Inserts a task row
    ///
    /// Authorization and assignee/status validation happen in
    /// `services::tasks::create_task`.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert<'e, E>(
        executor: E,
        project_id: Uuid,
        title: &str,
        description: Option<&str>,
        status: &str,
        priority: TaskPriority,
        due_date: Option<NaiveDate>,
        assignee_id: Uuid,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (project_id, title, description, status, priority, due_date,
                               assignee_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(project_id)
        .bind(title)
        .bind(description)
        .bind(status)
        .bind(priority)
        .bind(due_date)
        .bind(assignee_id)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(task)
    }

    /// Loads a task with project title and assignee name resolved
    pub async fn find_detail<'e, E>(executor: E, id: Uuid) -> Result<Option<TaskDetail>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let detail = sqlx::query_as::<_, TaskDetail>(
            r#"
            SELECT t.id, t.project_id, t.title, t.description, t.status, t.priority,
                   t.due_date, t.assignee_id, t.created_by, t.created_at, t.updated_at,
                   p.title AS project_title,
                   u.name AS assignee_name
            FROM tasks t
            JOIN projects p ON p.id = t.project_id
            LEFT JOIN users u ON u.id = t.assignee_id
            WHERE t.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(detail)
    }

    /// Lists the tasks of every project the user belongs to
    pub async fn list_for_member<'e, E>(
        executor: E,
        user_id: Uuid,
    ) -> Result<Vec<TaskDetail>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let tasks = sqlx::query_as::<_, TaskDetail>(
            r#"
            SELECT t.id, t.project_id, t.title, t.description, t.status, t.priority,
                   t.due_date, t.assignee_id, t.created_by, t.created_at, t.updated_at,
                   p.title AS project_title,
                   u.name AS assignee_name
            FROM tasks t
            JOIN projects p ON p.id = t.project_id
            JOIN project_members pm ON pm.project_id = t.project_id
            LEFT JOIN users u ON u.id = t.assignee_id
            WHERE pm.user_id = $1
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(tasks)
    }

    /// Moves every task of a project out of one status into another
    ///
    /// Used when a custom column is deleted: its tasks fall back to `todo`
    /// inside the deleting transaction.
    pub async fn reassign_status<'e, E>(
        executor: E,
        project_id: Uuid,
        from: &str,
        to: &str,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET status = $3, updated_at = NOW()
            WHERE project_id = $1 AND status = $2
            "#,
        )
        .bind(project_id)
        .bind(from)
        .bind(to)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Applies a partial update to a task row
    ///
    /// Validation of the new project, status, and assignee happens in
    /// `services::tasks::update_task` before this runs.
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        changes: &UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                priority = COALESCE($5, priority),
                due_date = COALESCE($6, due_date),
                project_id = COALESCE($7, project_id),
                assignee_id = COALESCE($8, assignee_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(&changes.status)
        .bind(changes.priority)
        .bind(changes.due_date)
        .bind(changes.project_id)
        .bind(changes.assignee_id)
        .fetch_optional(executor)
        .await?;

        Ok(task)
    }

    /// Sets a task's status
    pub async fn set_status<'e, E>(
        executor: E,
        id: Uuid,
        status: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?;

        Ok(task)
    }

    /// Deletes a task row
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_as_str() {
        assert_eq!(TaskPriority::Low.as_str(), "low");
        assert_eq!(TaskPriority::Medium.as_str(), "medium");
        assert_eq!(TaskPriority::High.as_str(), "high");
    }

    #[test]
    fn test_priority_serde_names() {
        let json = serde_json::to_string(&TaskPriority::High).unwrap();
        assert_eq!(json, "\"high\"");
    }
}
