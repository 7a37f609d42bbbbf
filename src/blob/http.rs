use reqwest::RequestBuilder;
use serde::Deserialize;

use super::{BlobError, BlobPath, BlobStore};

#[derive(Deserialize)]
struct DownloadUrlBody {
    download_url: String,
}

/// Blob store backed by the `bookit-server` storage routes.
#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpBlobStore {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn build_url(&self, route: &str, path: &BlobPath) -> String {
        let encoded: Vec<String> = path
            .segments()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect();
        format!("{}/{}/{}", self.base_url, route, encoded.join("/"))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

fn upload_error(path: &BlobPath, e: impl ToString) -> BlobError {
    BlobError::Upload {
        path: path.to_string(),
        message: e.to_string(),
    }
}

impl BlobStore for HttpBlobStore {
    async fn put(&self, path: &BlobPath, bytes: Vec<u8>) -> Result<(), BlobError> {
        let request = self.client.put(self.build_url("storage", path)).body(bytes);
        self.authorize(request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| upload_error(path, e))?;
        Ok(())
    }

    async fn download_url(&self, path: &BlobPath) -> Result<String, BlobError> {
        let request = self.client.get(self.build_url("download-url", path));
        let response = self
            .authorize(request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| upload_error(path, e))?;
        let body: DownloadUrlBody = response.json().await.map_err(|e| upload_error(path, e))?;
        Ok(body.download_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let store = HttpBlobStore::new("http://localhost:8080/", None);
        let path = BlobPath::new("product_images/u1").unwrap();

        assert_eq!(
            store.build_url("storage", &path),
            "http://localhost:8080/storage/product_images/u1"
        );
        assert_eq!(
            store.build_url("download-url", &path),
            "http://localhost:8080/download-url/product_images/u1"
        );
    }
}
