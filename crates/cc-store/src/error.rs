//! Store error types.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Rate limited, retry after {0}ms")]
    RateLimited(u64),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::AuthError(msg.into())
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    /// Map an HTTP status from the store backend to an error variant.
    pub fn from_http_status(status: u16, detail: String) -> Self {
        match status {
            404 => Self::NotFound(detail),
            409 => Self::AlreadyExists(detail),
            403 => Self::PermissionDenied(detail),
            412 => Self::PreconditionFailed(detail),
            429 => Self::RateLimited(1000),
            _ => Self::RequestFailed(detail),
        }
    }

    /// HTTP status associated with this error, if known.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::AlreadyExists(_) => Some(409),
            Self::PermissionDenied(_) => Some(403),
            Self::PreconditionFailed(_) => Some(412),
            Self::RateLimited(_) => Some(429),
            _ => None,
        }
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Network(_) | StoreError::RateLimited(_))
    }

    /// Suggested retry delay for rate-limited responses.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            StoreError::RateLimited(ms) => Some(*ms),
            _ => None,
        }
    }

    /// True if a write was rejected by a failed precondition, including
    /// the FAILED_PRECONDITION wording some responses embed in the body.
    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, StoreError::PreconditionFailed(_))
            || matches!(
                self,
                StoreError::RequestFailed(msg)
                if msg.contains("FAILED_PRECONDITION") || msg.contains("Precondition")
            )
    }

    /// True if a conditional create hit an existing document. A create
    /// precondition inside a commit surfaces as either 409 or a failed
    /// precondition depending on the write path.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists(_))
            || matches!(
                self,
                StoreError::RequestFailed(msg) if msg.contains("ALREADY_EXISTS")
            )
            || self.is_precondition_failed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_http_statuses() {
        assert!(matches!(
            StoreError::from_http_status(404, "x".into()),
            StoreError::NotFound(_)
        ));
        assert!(matches!(
            StoreError::from_http_status(409, "x".into()),
            StoreError::AlreadyExists(_)
        ));
        assert!(matches!(
            StoreError::from_http_status(412, "x".into()),
            StoreError::PreconditionFailed(_)
        ));
    }

    #[test]
    fn retryable_classification() {
        assert!(StoreError::RateLimited(100).is_retryable());
        assert!(!StoreError::NotFound("x".into()).is_retryable());
    }

    #[test]
    fn already_exists_covers_precondition() {
        assert!(StoreError::AlreadyExists("x".into()).is_already_exists());
        assert!(StoreError::PreconditionFailed("x".into()).is_already_exists());
        assert!(StoreError::RequestFailed("code: ALREADY_EXISTS".into()).is_already_exists());
        assert!(!StoreError::NotFound("x".into()).is_already_exists());
    }
}
