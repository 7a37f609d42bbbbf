//! Remote blob store adapter.
//!
//! Uploading is three steps: read the bytes behind a local URI, write them
//! to a blob path, then ask the store for a durable download URL.

mod fetch;
mod fs;
mod http;

pub use fetch::ResourceFetcher;
pub use fs::FsBlobStore;
pub use http::HttpBlobStore;

use std::fmt;
use std::future::Future;

use crate::store::validate_segment;

/// Errors from fetching a local resource or writing a blob.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// The local resource could not be read.
    #[error("Failed to fetch '{uri}': {message}")]
    Fetch { uri: String, message: String },
    /// The blob could not be written or its URL could not be resolved.
    #[error("Failed to upload '{path}': {message}")]
    Upload { path: String, message: String },
    /// The destination path failed validation.
    #[error("Invalid blob path: {0}")]
    InvalidPath(String),
}

impl BlobError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, BlobError::Upload { .. })
    }
}

/// A validated slash-separated blob location, e.g. `product_images/u1/service`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobPath(String);

impl BlobPath {
    pub fn new(path: &str) -> Result<Self, BlobError> {
        let trimmed = path.trim_matches('/');
        for segment in trimmed.split('/') {
            validate_segment(segment).map_err(|_| BlobError::InvalidPath(path.to_string()))?;
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Joins extra segments onto this path.
    pub fn join(&self, segment: &str) -> Result<Self, BlobError> {
        Self::new(&format!("{}/{}", self.0, segment))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Display for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Binary object storage addressed by [`BlobPath`].
pub trait BlobStore: Send + Sync {
    /// Writes `bytes` at `path`, replacing whatever was there.
    fn put(
        &self,
        path: &BlobPath,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<(), BlobError>> + Send;

    /// Returns a stable URL that resolves to the blob at `path`.
    fn download_url(&self, path: &BlobPath)
        -> impl Future<Output = Result<String, BlobError>> + Send;
}

/// Fetches `local_uri` and stores it at `destination`, returning its URL.
///
/// Nothing is written if the fetch fails.
pub async fn upload<B: BlobStore>(
    blobs: &B,
    fetcher: &ResourceFetcher,
    local_uri: &str,
    destination: &BlobPath,
) -> Result<String, BlobError> {
    let bytes = fetcher.fetch(local_uri).await?;
    let size = bytes.len();
    blobs.put(destination, bytes).await?;
    let url = blobs.download_url(destination).await?;
    tracing::info!(path = %destination, bytes = size, "uploaded blob");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_blob_path_validation() {
        assert_eq!(
            BlobPath::new("/product_images/u1/").unwrap().as_str(),
            "product_images/u1"
        );
        assert!(BlobPath::new("product_images/../etc").is_err());
        assert!(BlobPath::new("a//b").is_err());
        assert!(BlobPath::new("").is_err());
    }

    #[test]
    fn test_blob_path_join() {
        let base = BlobPath::new("product_images").unwrap();
        assert_eq!(base.join("u1").unwrap().as_str(), "product_images/u1");
        assert!(base.join("..").is_err());
    }

    #[tokio::test]
    async fn test_upload_local_file() {
        let temp_dir = tempdir().unwrap();
        let source = temp_dir.path().join("photo.jpg");
        std::fs::write(&source, b"jpeg bytes").unwrap();
        let blobs = FsBlobStore::new(temp_dir.path().join("blobs"));
        let destination = BlobPath::new("product_images/u1").unwrap();

        let url = upload(
            &blobs,
            &ResourceFetcher::new(),
            source.to_str().unwrap(),
            &destination,
        )
        .await
        .unwrap();

        assert!(url.starts_with("file://"));
        assert_eq!(
            blobs.read(&destination).await.unwrap(),
            Some(b"jpeg bytes".to_vec())
        );
    }

    #[tokio::test]
    async fn test_upload_missing_source_writes_nothing() {
        let temp_dir = tempdir().unwrap();
        let blobs = FsBlobStore::new(temp_dir.path().join("blobs"));
        let destination = BlobPath::new("product_images/u1").unwrap();
        let missing = temp_dir.path().join("missing.jpg");

        let result = upload(
            &blobs,
            &ResourceFetcher::new(),
            missing.to_str().unwrap(),
            &destination,
        )
        .await;

        assert!(matches!(result, Err(BlobError::Fetch { .. })));
        assert_eq!(blobs.read(&destination).await.unwrap(), None);
    }
}
