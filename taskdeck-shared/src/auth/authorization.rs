/// The membership authority: role-hierarchy authorization checks
///
/// This module is the single place authorization decisions are made. Every
/// mutating operation calls one of these functions before touching state;
/// nothing else in the codebase inspects membership rows for access control.
///
/// # Contract
///
/// - `role_of` returns the actor's role on a project, or `None` when no
///   membership exists. It never errors for "no access": absence of
///   membership fails closed as `None`.
/// - `has_min_role` compares against the ordering owner > admin > member.
/// - `require_membership` / `require_role` are the fallible forms used by
///   the services; they surface a typed `AuthzError` the caller maps to an
///   authorization failure.
///
/// All functions are generic over [`sqlx::PgExecutor`] so the check runs on
/// the caller's connection, inside the same transaction as the mutation it
/// guards, which serializes the check-then-act sequence against concurrent
/// writes.
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::auth::authorization::require_role;
/// use taskdeck_shared::models::membership::ProjectRole;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// // Team management requires admin or owner
/// require_role(&pool, project_id, user_id, ProjectRole::Admin).await?;
/// # Ok(())
/// # }
/// ```
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::membership::ProjectRole;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// User holds no membership on the project
    #[error("not a member of project {0}")]
    NotMember(Uuid),

    /// User's role does not meet the required minimum
    #[error("insufficient role: requires {required:?}, has {actual:?}")]
    InsufficientRole {
        required: ProjectRole,
        actual: ProjectRole,
    },

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Returns the role a user holds on a project, if any
///
/// `None` means no membership, which is equivalent to no access.
pub async fn role_of<'e, E>(
    executor: E,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<Option<ProjectRole>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let role: Option<ProjectRole> = sqlx::query_scalar(
        r#"
        SELECT role FROM project_members
        WHERE project_id = $1 AND user_id = $2
        "#,
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(role)
}

/// Checks whether a user holds at least the given role on a project
///
/// Never errors on missing membership: that is simply `false`.
pub async fn has_min_role<'e, E>(
    executor: E,
    project_id: Uuid,
    user_id: Uuid,
    min: ProjectRole,
) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let role = role_of(executor, project_id, user_id).await?;

    Ok(role.map(|r| r.has_min(min)).unwrap_or(false))
}

/// Requires that a user holds any membership on a project
///
/// # Errors
///
/// Returns `AuthzError::NotMember` when no membership exists.
pub async fn require_membership<'e, E>(
    executor: E,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<ProjectRole, AuthzError>
where
    E: PgExecutor<'e>,
{
    role_of(executor, project_id, user_id)
        .await?
        .ok_or(AuthzError::NotMember(project_id))
}

/// Requires that a user holds at least the given role on a project
///
/// # Errors
///
/// Returns `AuthzError::NotMember` when no membership exists, or
/// `AuthzError::InsufficientRole` when the role is too low.
pub async fn require_role<'e, E>(
    executor: E,
    project_id: Uuid,
    user_id: Uuid,
    required: ProjectRole,
) -> Result<ProjectRole, AuthzError>
where
    E: PgExecutor<'e>,
{
    let actual = require_membership(executor, project_id, user_id).await?;

    if !actual.has_min(required) {
        return Err(AuthzError::InsufficientRole { required, actual });
    }

    Ok(actual)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authz_error_display() {
        let err = AuthzError::NotMember(Uuid::nil());
        assert!(err.to_string().contains("not a member"));

        let err = AuthzError::InsufficientRole {
            required: ProjectRole::Admin,
            actual: ProjectRole::Member,
        };
        assert!(err.to_string().contains("Admin"));
        assert!(err.to_string().contains("Member"));
    }

    // role_of / has_min_role are exercised against a live database in
    // taskdeck-api/tests/integration_test.rs.
}
