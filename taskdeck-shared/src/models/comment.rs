/// Comment model and database operations
///
/// Comments hang off tasks and may be nested one level deep via `parent_id`.
/// They matter to the core mostly as cascade targets: deleting a task or a
/// project must remove its comments in the same transaction.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id),
///     user_id UUID NOT NULL REFERENCES users(id),
///     parent_id UUID REFERENCES comments(id),
///     body TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Comment row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    /// Unique comment ID
    pub id: Uuid,

    /// Task the comment belongs to
    pub task_id: Uuid,

    /// Author
    pub user_id: Uuid,

    /// Parent comment for replies, if any
    pub parent_id: Option<Uuid>,

    /// Comment text
    pub body: String,

    /// When the comment was created
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a comment on a task
    pub async fn create<'e, E>(
        executor: E,
        task_id: Uuid,
        user_id: Uuid,
        parent_id: Option<Uuid>,
        body: &str,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (task_id, user_id, parent_id, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, task_id, user_id, parent_id, body, created_at
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .bind(parent_id)
        .bind(body)
        .fetch_one(executor)
        .await?;

        Ok(comment)
    }

    /// Lists a task's comments, newest first
    pub async fn list_by_task<'e, E>(executor: E, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, user_id, parent_id, body, created_at
            FROM comments
            WHERE task_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(task_id)
        .fetch_all(executor)
        .await?;

        Ok(comments)
    }

    /// Deletes every comment attached to a task
    ///
    /// Replies reference their parent, so children go first. Takes a
    /// connection rather than an executor because it is always part of a
    /// larger transaction.
    pub async fn delete_by_task(
        conn: &mut sqlx::PgConnection,
        task_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let replies =
            sqlx::query("DELETE FROM comments WHERE task_id = $1 AND parent_id IS NOT NULL")
                .bind(task_id)
                .execute(&mut *conn)
                .await?;

        let roots = sqlx::query("DELETE FROM comments WHERE task_id = $1")
            .bind(task_id)
            .execute(&mut *conn)
            .await?;

        Ok(replies.rows_affected() + roots.rows_affected())
    }

    /// Deletes every comment attached to any task of a project
    ///
    /// First step of the project deletion cascade.
    pub async fn delete_by_project(
        conn: &mut sqlx::PgConnection,
        project_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let replies = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE parent_id IS NOT NULL
              AND task_id IN (SELECT id FROM tasks WHERE project_id = $1)
            "#,
        )
        .bind(project_id)
        .execute(&mut *conn)
        .await?;

        let roots = sqlx::query(
            "DELETE FROM comments WHERE task_id IN (SELECT id FROM tasks WHERE project_id = $1)",
        )
        .bind(project_id)
        .execute(&mut *conn)
        .await?;

        Ok(replies.rows_affected() + roots.rows_affected())
    }
}
