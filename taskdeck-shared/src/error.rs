/// Common error taxonomy for domain operations
///
/// Every service operation returns `Result<T, CoreError>`. The variants map
/// onto the HTTP layer as follows (see `taskdeck-api/src/error.rs`):
///
/// - `Validation` → 422
/// - `Unauthorized` → 403
/// - `NotFound` → 404
/// - `DuplicateIdentifier`, `AlreadyMember`, `NotProjectMember`,
///   `ProtectedColumn`, `InvalidColumn`, `InvalidAssignee` → 422
/// - `SelfRemovalForbidden` → 400
/// - `Database` → 500 (transaction failure: the whole operation rolled back)
///
/// Nothing is silently swallowed; lower layers propagate these upward with `?`.

/// Result alias for domain operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Typed errors surfaced by the domain services
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    /// Actor lacks the role required for the operation
    #[error("{0}")]
    Unauthorized(String),

    /// Entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A board column with this identifier already exists for the project
    #[error("column identifier '{0}' already exists for this project")]
    DuplicateIdentifier(String),

    /// The three built-in columns can never be deleted
    #[error("cannot delete fixed column '{0}'")]
    ProtectedColumn(String),

    /// The target status is not a board column of the task's project
    #[error("invalid column identifier '{0}'")]
    InvalidColumn(String),

    /// The assignee is not a member of the task's project
    #[error("assignee must be a member of the project")]
    InvalidAssignee,

    /// The user already holds a membership on the project
    #[error("user is already a member of this project")]
    AlreadyMember,

    /// The user holds no membership on the project
    #[error("user is not a member of this project")]
    NotProjectMember,

    /// A user may never remove their own membership
    #[error("you cannot remove yourself from the team")]
    SelfRemovalForbidden,

    /// A uniqueness rule other than the column identifier was violated
    #[error("{0}")]
    Conflict(String),

    /// Unexpected failure inside an atomic operation; everything rolled back
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<crate::auth::authorization::AuthzError> for CoreError {
    fn from(err: crate::auth::authorization::AuthzError) -> Self {
        use crate::auth::authorization::AuthzError;
        match err {
            AuthzError::NotMember(project_id) => {
                CoreError::Unauthorized(format!("not a member of project {project_id}"))
            }
            AuthzError::InsufficientRole { required, .. } => {
                CoreError::Unauthorized(format!("requires at least the {required:?} role"))
            }
            AuthzError::Database(e) => CoreError::Database(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::DuplicateIdentifier("review".to_string());
        assert_eq!(
            err.to_string(),
            "column identifier 'review' already exists for this project"
        );

        let err = CoreError::ProtectedColumn("todo".to_string());
        assert_eq!(err.to_string(), "cannot delete fixed column 'todo'");

        let err = CoreError::NotFound("project");
        assert_eq!(err.to_string(), "project not found");
    }

    #[test]
    fn test_self_removal_message() {
        let err = CoreError::SelfRemovalForbidden;
        assert!(err.to_string().contains("cannot remove yourself"));
    }
}
