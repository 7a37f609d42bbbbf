use super::BlobError;

/// Reads the bytes behind a local resource URI.
///
/// `http://` and `https://` URIs are downloaded; `file://` URIs and bare
/// paths are read from disk.
#[derive(Debug, Clone, Default)]
pub struct ResourceFetcher {
    client: reqwest::Client,
}

impl ResourceFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn fetch(&self, uri: &str) -> Result<Vec<u8>, BlobError> {
        let failed = |message: String| BlobError::Fetch {
            uri: uri.to_string(),
            message,
        };

        if uri.starts_with("http://") || uri.starts_with("https://") {
            let response = self
                .client
                .get(uri)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| failed(e.to_string()))?;
            let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;
            return Ok(bytes.to_vec());
        }

        let path = uri.strip_prefix("file://").unwrap_or(uri);
        tokio::fs::read(path)
            .await
            .map_err(|e| failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_fetch_file_uri_and_bare_path() {
        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("image.png");
        std::fs::write(&file, [1u8, 2, 3]).unwrap();
        let fetcher = ResourceFetcher::new();

        let bare = fetcher.fetch(file.to_str().unwrap()).await.unwrap();
        let uri = format!("file://{}", file.display());
        let prefixed = fetcher.fetch(&uri).await.unwrap();

        assert_eq!(bare, vec![1, 2, 3]);
        assert_eq!(prefixed, bare);
    }

    #[tokio::test]
    async fn test_fetch_missing_file_is_fetch_error() {
        let result = ResourceFetcher::new()
            .fetch("file:///definitely/not/here.png")
            .await;

        match result {
            Err(BlobError::Fetch { uri, .. }) => assert_eq!(uri, "file:///definitely/not/here.png"),
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    async fn serve_image() -> String {
        let app = axum::Router::new().route(
            "/image.png",
            axum::routing::get(|| async { vec![7u8, 8, 9] }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_http_downloads_body() {
        let base = serve_image().await;

        let bytes = ResourceFetcher::new()
            .fetch(&format!("{}/image.png", base))
            .await
            .unwrap();

        assert_eq!(bytes, vec![7, 8, 9]);
    }

    #[tokio::test]
    async fn test_fetch_http_error_status_is_fetch_error() {
        let base = serve_image().await;
        let uri = format!("{}/missing.png", base);

        match ResourceFetcher::new().fetch(&uri).await {
            Err(BlobError::Fetch { uri: failed, message }) => {
                assert_eq!(failed, uri);
                assert!(message.contains("404"), "unexpected message: {}", message);
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_from_closed_port_is_fetch_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let uri = format!("http://{}/image.png", addr);

        let result = ResourceFetcher::new().fetch(&uri).await;

        assert!(matches!(result, Err(BlobError::Fetch { .. })));
    }
}
