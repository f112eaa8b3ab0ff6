/// API route handlers
///
/// Handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `projects`: Project lifecycle (create, list, update, cascade delete)
/// - `team`: Roster management, per-project and fan-out
/// - `board`: Board column registry
/// - `tasks`: Task lifecycle and comments
pub mod board;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod team;
