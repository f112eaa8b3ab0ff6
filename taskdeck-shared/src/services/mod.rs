/// Transactional domain operations
///
/// Each function here is one synchronous operation executed inside a single
/// database transaction: the authorization check and the mutation share the
/// transaction, so the check-then-act sequence is serialized by the
/// database's isolation level. Failures surface as [`crate::error::CoreError`]
/// and roll the whole operation back; partial application is never possible.
///
/// # Modules
///
/// - `projects`: project lifecycle (create with owner membership, cascading delete)
/// - `board`: the board column registry (fixed + custom task statuses)
/// - `tasks`: the task state machine (create, update, move, delete, comments)
/// - `roster`: team membership (per-project and fan-out invite/remove/re-role)
pub mod board;
pub mod projects;
pub mod roster;
pub mod tasks;
