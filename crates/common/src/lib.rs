//! Pressroom Common Library
//!
//! Shared code for the Pressroom services including:
//! - Database models and repository patterns
//! - Editorial workflow engine (permissions, state machine, executor)
//! - Notification dispatch
//! - Error types and handling
//! - Configuration management
//! - Authentication utilities
//! - Metrics and observability

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod notify;
pub mod workflow;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::Repository;
pub use errors::{AppError, Result};
pub use workflow::{Role, WorkflowAction, WorkflowStatus};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
