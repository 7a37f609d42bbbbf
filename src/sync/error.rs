//! Thunk error types.

use crate::blob::BlobError;
use crate::credentials::CredentialError;
use crate::store::StoreError;

/// Why a thunk stopped before dispatching.
///
/// When a thunk returns one of these, no state-transition action was
/// dispatched and the state still reflects the last successful remote view.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Blob(#[from] BlobError),
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    /// The patch could not be applied to the local profile.
    #[error("Invalid profile patch: {0}")]
    InvalidPatch(String),
    /// A fetched record does not have the shape of its entity.
    #[error("Failed to decode {collection} record {id}: {message}")]
    Decode {
        collection: String,
        id: String,
        message: String,
    },
}

impl SyncError {
    /// True when repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Store(e) => e.is_retryable(),
            SyncError::Blob(e) => e.is_retryable(),
            SyncError::Credentials(_) | SyncError::InvalidPatch(_) | SyncError::Decode { .. } => {
                false
            }
        }
    }
}
