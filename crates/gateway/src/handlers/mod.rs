//! Request handlers

pub mod articles;
pub mod health;
pub mod notifications;
pub mod users;
pub mod workflow;
