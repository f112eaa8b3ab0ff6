/// Database models for Taskdeck
///
/// This module contains the row types and their CRUD operations. Query
/// methods are generic over [`sqlx::PgExecutor`] so they run equally against
/// the pool or inside a transaction; multi-step invariants (owner membership
/// at creation, cascading deletion, status validation) live in `services`.
///
/// # Models
///
/// - `user`: identities (credentials are external)
/// - `project`: projects with dates and a lifecycle status
/// - `membership`: the (project, user, role) relation
/// - `board_column`: per-project task-status columns, fixed and custom
/// - `task`: tasks moving between board columns
/// - `comment`: task comments, cascade targets
pub mod board_column;
pub mod comment;
pub mod membership;
pub mod project;
pub mod task;
pub mod user;
