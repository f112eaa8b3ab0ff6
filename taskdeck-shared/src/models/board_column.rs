/// Board column model: the per-project set of valid task statuses
///
/// Every project has three fixed columns (`todo`, `in_progress`,
/// `completed`) that always logically exist and are never stored or
/// deletable. Users may add custom columns; those are the rows in
/// `board_columns`. A task's `status` is valid iff it equals the identifier
/// of a fixed column or of one of the project's custom columns.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE board_columns (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id),
///     identifier VARCHAR(255) NOT NULL,
///     title VARCHAR(255) NOT NULL,
///     position INTEGER NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (project_id, identifier),
///     UNIQUE (project_id, position)
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// The three built-in column identifiers with their display titles,
/// in board order
pub const FIXED_COLUMNS: [(&str, &str); 3] = [
    ("todo", "To Do"),
    ("in_progress", "In Progress"),
    ("completed", "Completed"),
];

/// Checks whether an identifier names one of the fixed columns
pub fn is_fixed_identifier(identifier: &str) -> bool {
    FIXED_COLUMNS.iter().any(|(id, _)| *id == identifier)
}

/// Derives a column identifier from a title: lowercased, whitespace
/// replaced by underscores
pub fn slugify(title: &str) -> String {
    title
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// A stored custom column row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ColumnRow {
    /// Unique column ID
    pub id: Uuid,

    /// Project the column belongs to
    pub project_id: Uuid,

    /// Status identifier, unique within the project
    pub identifier: String,

    /// Display title
    pub title: String,

    /// Board position among custom columns, unique within the project
    pub position: i32,

    /// When the column was created
    pub created_at: DateTime<Utc>,

    /// When the column was last updated
    pub updated_at: DateTime<Utc>,
}

/// A board column as presented by the registry: fixed or custom
#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    /// Row ID for custom columns; fixed columns have none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    /// Status identifier
    pub identifier: String,

    /// Display title
    pub title: String,

    /// Board position
    pub position: i32,

    /// Whether this is one of the three built-in columns
    pub is_fixed: bool,
}

impl BoardColumn {
    /// The three fixed columns, in board order
    pub fn fixed() -> Vec<Self> {
        FIXED_COLUMNS
            .iter()
            .enumerate()
            .map(|(position, (identifier, title))| BoardColumn {
                id: None,
                identifier: (*identifier).to_string(),
                title: (*title).to_string(),
                position: position as i32,
                is_fixed: true,
            })
            .collect()
    }
}

impl From<ColumnRow> for BoardColumn {
    fn from(row: ColumnRow) -> Self {
        BoardColumn {
            id: Some(row.id),
            identifier: row.identifier,
            title: row.title,
            position: row.position,
            is_fixed: false,
        }
    }
}

impl ColumnRow {
    /// Lists a project's custom columns by position ascending
    pub async fn list_by_project<'e, E>(
        executor: E,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let columns = sqlx::query_as::<_, ColumnRow>(
            r#"
            SELECT id, project_id, identifier, title, position, created_at, updated_at
            FROM board_columns
            WHERE project_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(executor)
        .await?;

        Ok(columns)
    }

    /// Finds a custom column by its identifier within a project
    pub async fn find_by_identifier<'e, E>(
        executor: E,
        project_id: Uuid,
        identifier: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let column = sqlx::query_as::<_, ColumnRow>(
            r#"
            SELECT id, project_id, identifier, title, position, created_at, updated_at
            FROM board_columns
            WHERE project_id = $1 AND identifier = $2
            "#,
        )
        .bind(project_id)
        .bind(identifier)
        .fetch_optional(executor)
        .await?;

        Ok(column)
    }

    /// Checks whether an identifier is taken by a custom column of the project
    pub async fn identifier_exists<'e, E>(
        executor: E,
        project_id: Uuid,
        identifier: &str,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM board_columns
                WHERE project_id = $1 AND identifier = $2
            )
            "#,
        )
        .bind(project_id)
        .bind(identifier)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    /// Returns the highest position among the project's custom columns
    pub async fn max_position<'e, E>(executor: E, project_id: Uuid) -> Result<i32, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let max: Option<i32> =
            sqlx::query_scalar("SELECT MAX(position) FROM board_columns WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(executor)
                .await?;

        Ok(max.unwrap_or(0))
    }

    /// Inserts a custom column
    pub async fn insert<'e, E>(
        executor: E,
        project_id: Uuid,
        identifier: &str,
        title: &str,
        position: i32,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let column = sqlx::query_as::<_, ColumnRow>(
            r#"
            INSERT INTO board_columns (project_id, identifier, title, position)
            VALUES ($1, $2, $3, $4)
            RETURNING id, project_id, identifier, title, position, created_at, updated_at
            "#,
        )
        .bind(project_id)
        .bind(identifier)
        .bind(title)
        .bind(position)
        .fetch_one(executor)
        .await?;

        Ok(column)
    }

    /// Updates a column's title and/or position
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        title: Option<&str>,
        position: Option<i32>,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let column = sqlx::query_as::<_, ColumnRow>(
            r#"
            UPDATE board_columns
            SET title = COALESCE($2, title),
                position = COALESCE($3, position),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, identifier, title, position, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(position)
        .fetch_optional(executor)
        .await?;

        Ok(column)
    }

    /// Deletes a custom column row
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM board_columns WHERE id = $1")
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
    fn test_slugify() {
        assert_eq!(slugify("Review"), "review");
        assert_eq!(slugify("Code Review"), "code_review");
        assert_eq!(slugify("  Ready   For QA "), "ready_for_qa");
    }

    #[test]
    fn test_fixed_identifiers() {
        assert!(is_fixed_identifier("todo"));
        assert!(is_fixed_identifier("in_progress"));
        assert!(is_fixed_identifier("completed"));
        assert!(!is_fixed_identifier("review"));
        assert!(!is_fixed_identifier(""));
    }

    #[test]
    fn test_fixed_columns_shape() {
        let fixed = BoardColumn::fixed();
        assert_eq!(fixed.len(), 3);
        assert!(fixed.iter().all(|c| c.is_fixed && c.id.is_none()));
        assert_eq!(fixed[0].identifier, "todo");
        assert_eq!(fixed[1].identifier, "in_progress");
        assert_eq!(fixed[2].identifier, "completed");
    }
}
