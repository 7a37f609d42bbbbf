//! Document store error types.

/// Errors from a document store adapter.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("Network error: {0}")]
    Network(String),
    /// The backend refused the request.
    #[error("Permission denied: {0}")]
    Permission(String),
    /// The addressed document does not exist.
    #[error("Document not found: {path}/{id}")]
    NotFound { path: String, id: String },
    /// A collection path or document id failed validation.
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    /// The backend reported a failure of its own.
    #[error("Backend error: {0}")]
    Backend(String),
    /// A stored or returned payload was not a document.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl StoreError {
    /// True for failures worth retrying unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Network(_) | StoreError::Backend(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(StoreError::Network("down".into()).is_retryable());
        assert!(StoreError::Backend("500".into()).is_retryable());
        assert!(!StoreError::Permission("no".into()).is_retryable());
        assert!(!StoreError::InvalidPath("..".into()).is_retryable());
        assert!(!StoreError::NotFound {
            path: "appointments".into(),
            id: "a1".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_not_found_message() {
        let err = StoreError::NotFound {
            path: "service-providers".into(),
            id: "u1".into(),
        };
        assert_eq!(err.to_string(), "Document not found: service-providers/u1");
    }
}
