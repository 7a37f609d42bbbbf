//! Remote document store adapter.
//!
//! Documents are flat JSON objects addressed by collection path and id.
//! Two adapters implement [`DocumentStore`]:
//! - [`SqliteDocumentStore`]: local SQLite database (also backs the server)
//! - [`HttpDocumentStore`]: the `bookit-server` REST API

mod error;
mod http;
mod path;
mod sqlite;

pub use error::StoreError;
pub use http::HttpDocumentStore;
pub use path::{validate_segment, Collection, CollectionPath, Scope};
pub use sqlite::{init_db, SqliteDocumentStore};

use std::future::Future;

use crate::models::{Fields, Record};

/// CRUD over a document collection.
///
/// Every record returned by `list` carries the store-assigned id, never an
/// `id` key from the stored payload. Failures are always reported; an
/// adapter never answers a failed call with an empty success.
pub trait DocumentStore: Send + Sync {
    /// Lists every document in the collection, in insertion order.
    fn list(
        &self,
        path: &CollectionPath,
    ) -> impl Future<Output = Result<Vec<Record>, StoreError>> + Send;

    /// Creates a document and returns its assigned id.
    fn create(
        &self,
        path: &CollectionPath,
        data: &Fields,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Writes a document under a caller-chosen id, replacing any existing one.
    fn set(
        &self,
        path: &CollectionPath,
        id: &str,
        data: &Fields,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Merges `patch` into an existing document at the top level.
    ///
    /// Fails with [`StoreError::NotFound`] if the document does not exist.
    fn update(
        &self,
        path: &CollectionPath,
        id: &str,
        patch: &Fields,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Deletes a document. Deleting a missing document succeeds.
    fn delete(
        &self,
        path: &CollectionPath,
        id: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
