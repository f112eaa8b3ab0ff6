//! # Taskdeck Shared Library
//!
//! This crate contains the models, database layer, and business logic shared
//! by the Taskdeck API server and its tests.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `services`: Transactional domain operations (projects, tasks, board, roster)
//! - `auth`: Authorization checks and JWT helpers
//! - `db`: Connection pooling and migrations
//! - `error`: Common error taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

/// Current version of the Taskdeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
