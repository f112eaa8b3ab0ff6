/// Authentication and authorization for Taskdeck
///
/// # Modules
///
/// - `jwt`: Access-token creation and validation (HS256)
/// - `authorization`: The membership authority, the single role-hierarchy
///   check every mutating operation goes through
pub mod authorization;
pub mod jwt;
