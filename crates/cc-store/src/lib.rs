//! Document store layer for CareerConnect.
//!
//! Talks to Firestore over its REST API with cached service-account tokens,
//! retried requests, and atomic multi-document commits. Higher layers only
//! see typed repositories and the lifecycle coordinator.

pub mod application_repo;
pub mod client;
pub mod error;
pub mod job_repo;
pub mod lifecycle;
pub mod metrics;
pub mod notification_repo;
pub mod retry;
pub mod token_cache;
pub mod types;
pub mod user_repo;

pub use application_repo::{ApplicationRepository, APPLICATIONS};
pub use client::{StoreClient, StoreConfig, MAX_WRITES_PER_COMMIT};
pub use error::{StoreError, StoreResult};
pub use job_repo::{JobQuery, JobRepository, JOBS};
pub use lifecycle::LifecycleCoordinator;
pub use notification_repo::{NotificationRepository, NOTIFICATIONS};
pub use retry::RetryConfig;
pub use user_repo::{UserRepository, EMAIL_INDEX, USERS};
