//! Shared data models for the CareerConnect backend.
//!
//! This crate provides Serde-serializable types for:
//! - User accounts and roles
//! - Job postings
//! - Applications and their status lifecycle
//! - Notifications

pub mod application;
pub mod job;
pub mod notification;
pub mod role;
pub mod user;

// Re-export common types
pub use application::{Application, ApplicationStatus};
pub use job::{Job, JobType, Salary};
pub use notification::{Notification, NotificationKind, RelatedKind};
pub use role::Role;
pub use user::{Education, Experience, User};
