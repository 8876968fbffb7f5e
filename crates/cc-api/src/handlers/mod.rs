//! Request handlers.

pub mod admin;
pub mod auth;
pub mod health;
pub mod jobs;
pub mod notifications;
pub mod recruiters;
pub mod users;

pub use health::*;
