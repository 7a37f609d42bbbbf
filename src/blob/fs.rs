//! Filesystem blob storage.
//!
//! Blobs are stored as plain files under the root directory, one file per
//! blob path:
//! ```text
//! <ROOT>/
//!   product_images/
//!     <identity id>/
//!       service
//! ```

use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::{BlobError, BlobPath, BlobStore};

#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    /// Base URL blobs are served from; `file://` URLs are used when unset.
    public_url: Option<String>,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            public_url: None,
        }
    }

    /// Serves download URLs as `{public_url}/{blob path}`.
    pub fn with_public_url(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: Some(public_url.into().trim_end_matches('/').to_string()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, path: &BlobPath) -> PathBuf {
        path.segments()
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }

    /// Reads a blob back. Returns `Ok(None)` if nothing is stored there.
    pub async fn read(&self, path: &BlobPath) -> Result<Option<Vec<u8>>, BlobError> {
        match tokio::fs::read(self.file_path(path)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(upload_error(path, e)),
        }
    }
}

/// Hidden sibling of `file_path` that no other blob name maps onto.
fn temp_path_for(file_path: &Path) -> PathBuf {
    let name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    file_path.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
}

fn upload_error(path: &BlobPath, e: io::Error) -> BlobError {
    BlobError::Upload {
        path: path.to_string(),
        message: e.to_string(),
    }
}

impl BlobStore for FsBlobStore {
    async fn put(&self, path: &BlobPath, bytes: Vec<u8>) -> Result<(), BlobError> {
        let file_path = self.file_path(path);

        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| upload_error(path, e))?;
        }

        // Write atomically using temp file + rename
        let temp_path = temp_path_for(&file_path);
        tokio::fs::write(&temp_path, &bytes)
            .await
            .map_err(|e| upload_error(path, e))?;
        tokio::fs::rename(&temp_path, &file_path)
            .await
            .map_err(|e| upload_error(path, e))?;

        Ok(())
    }

    async fn download_url(&self, path: &BlobPath) -> Result<String, BlobError> {
        let file_path = self.file_path(path);
        if !tokio::fs::try_exists(&file_path)
            .await
            .map_err(|e| upload_error(path, e))?
        {
            return Err(BlobError::Upload {
                path: path.to_string(),
                message: "no blob stored at this path".to_string(),
            });
        }

        match &self.public_url {
            Some(base) => {
                let encoded: Vec<String> = path
                    .segments()
                    .map(|s| urlencoding::encode(s).into_owned())
                    .collect();
                Ok(format!("{}/{}", base, encoded.join("/")))
            }
            None => {
                let absolute = std::path::absolute(&file_path).map_err(|e| upload_error(path, e))?;
                Ok(format!("file://{}", absolute.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (FsBlobStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(temp_dir.path());
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_put_creates_directory_structure() {
        let (store, temp) = setup();
        let path = BlobPath::new("product_images/u1/service").unwrap();

        store.put(&path, b"abc".to_vec()).await.unwrap();

        let expected = temp.path().join("product_images").join("u1").join("service");
        assert_eq!(std::fs::read(expected).unwrap(), b"abc");
    }

    #[tokio::test]
    async fn test_put_does_not_clobber_similarly_named_blobs() {
        let (store, temp) = setup();
        let dotted = BlobPath::new("product_images/u1.tmp").unwrap();
        let plain = BlobPath::new("product_images/u1").unwrap();

        store.put(&dotted, b"first".to_vec()).await.unwrap();
        store.put(&plain, b"second".to_vec()).await.unwrap();

        assert_eq!(store.read(&dotted).await.unwrap(), Some(b"first".to_vec()));
        assert_eq!(store.read(&plain).await.unwrap(), Some(b"second".to_vec()));
        // No temp files are left behind.
        let entries = std::fs::read_dir(temp.path().join("product_images"))
            .unwrap()
            .count();
        assert_eq!(entries, 2);
    }

    #[tokio::test]
    async fn test_put_overwrites_existing() {
        let (store, _temp) = setup();
        let path = BlobPath::new("product_images").unwrap();

        store.put(&path, b"one".to_vec()).await.unwrap();
        store.put(&path, b"two".to_vec()).await.unwrap();

        assert_eq!(store.read(&path).await.unwrap(), Some(b"two".to_vec()));
    }

    #[tokio::test]
    async fn test_download_url_requires_blob() {
        let (store, _temp) = setup();
        let path = BlobPath::new("product_images/nothing").unwrap();

        let result = store.download_url(&path).await;
        assert!(matches!(result, Err(BlobError::Upload { .. })));
    }

    #[tokio::test]
    async fn test_download_url_with_public_base() {
        let temp = TempDir::new().unwrap();
        let store = FsBlobStore::with_public_url(temp.path(), "https://cdn.example.com/storage/");
        let path = BlobPath::new("product_images/u 1").unwrap();
        store.put(&path, b"x".to_vec()).await.unwrap();

        let url = store.download_url(&path).await.unwrap();
        assert_eq!(url, "https://cdn.example.com/storage/product_images/u%201");
    }

    #[tokio::test]
    async fn test_download_url_defaults_to_file_url() {
        let (store, temp) = setup();
        let path = BlobPath::new("product_images").unwrap();
        store.put(&path, b"x".to_vec()).await.unwrap();

        let url = store.download_url(&path).await.unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("product_images"));
        assert!(url.contains(&temp.path().file_name().unwrap().to_string_lossy().to_string()));
    }
}
