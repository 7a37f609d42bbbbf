//! REST client for the `bookit-server` document API.

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use super::{validate_segment, CollectionPath, DocumentStore, StoreError};
use crate::models::{Fields, Record};

#[derive(Deserialize)]
struct DocumentBody {
    id: String,
    #[serde(default)]
    data: Fields,
}

#[derive(Deserialize)]
struct CreatedBody {
    id: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Document store that talks HTTP to a `bookit-server`.
#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpDocumentStore {
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

    /// Builds `{base}/documents/{segments...}` with each segment encoded.
    fn build_url(&self, path: &CollectionPath, id: Option<&str>) -> String {
        let mut url = format!("{}/documents", self.base_url);
        for segment in path.segments().iter().map(String::as_str).chain(id) {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn send(
        &self,
        request: RequestBuilder,
        path: &CollectionPath,
        id: Option<&str>,
    ) -> Result<Response, StoreError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or(text);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Permission(message),
            StatusCode::NOT_FOUND => match id {
                Some(id) => StoreError::NotFound {
                    path: path.to_string(),
                    id: id.to_string(),
                },
                None => StoreError::Backend(format!("{}: {}", status, message)),
            },
            StatusCode::BAD_REQUEST => StoreError::InvalidPath(message),
            _ => StoreError::Backend(format!("{}: {}", status, message)),
        })
    }
}

fn transport_error(e: reqwest::Error) -> StoreError {
    if e.is_decode() {
        StoreError::Decode(e.to_string())
    } else {
        StoreError::Network(e.to_string())
    }
}

impl DocumentStore for HttpDocumentStore {
    async fn list(&self, path: &CollectionPath) -> Result<Vec<Record>, StoreError> {
        let request = self.client.get(self.build_url(path, None));
        let response = self.send(request, path, None).await?;
        let documents: Vec<DocumentBody> = response.json().await.map_err(transport_error)?;

        tracing::debug!(path = %path, count = documents.len(), "listed documents");
        Ok(documents
            .into_iter()
            .map(|doc| Record::from_document(doc.id, doc.data))
            .collect())
    }

    async fn create(&self, path: &CollectionPath, data: &Fields) -> Result<String, StoreError> {
        let request = self.client.post(self.build_url(path, None)).json(data);
        let response = self.send(request, path, None).await?;
        let created: CreatedBody = response.json().await.map_err(transport_error)?;
        Ok(created.id)
    }

    async fn set(&self, path: &CollectionPath, id: &str, data: &Fields) -> Result<(), StoreError> {
        validate_segment(id)?;
        let request = self.client.put(self.build_url(path, Some(id))).json(data);
        self.send(request, path, Some(id)).await?;
        Ok(())
    }

    async fn update(
        &self,
        path: &CollectionPath,
        id: &str,
        patch: &Fields,
    ) -> Result<(), StoreError> {
        validate_segment(id)?;
        let request = self.client.patch(self.build_url(path, Some(id))).json(patch);
        self.send(request, path, Some(id)).await?;
        Ok(())
    }

    async fn delete(&self, path: &CollectionPath, id: &str) -> Result<(), StoreError> {
        validate_segment(id)?;
        let request = self.client.delete(self.build_url(path, Some(id)));
        self.send(request, path, Some(id)).await?;
        Ok(())
    }
}
