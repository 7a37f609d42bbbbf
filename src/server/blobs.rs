//! Blob upload, download and URL routes.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::Serialize;

use super::auth::AuthUser;
use super::{ApiError, ServerState};
use crate::blob::{BlobPath, BlobStore};

#[derive(Debug, Serialize)]
pub struct DownloadUrlBody {
    download_url: String,
}

pub async fn put_blob(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Path(raw): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let path = BlobPath::new(&raw)?;
    // Uploads live under `{prefix}/{user id}/...`.
    if path.segments().nth(1) != Some(user.user_id.as_str()) {
        return Err(ApiError::Forbidden(format!(
            "{} may not write {}",
            user.user_id, path
        )));
    }
    let size = body.len();
    state.blobs.put(&path, body.to_vec()).await?;
    tracing::info!(user = %user.user_id, path = %path, size, "stored blob");
    Ok(StatusCode::NO_CONTENT)
}

/// Public read; download URLs point here.
pub async fn get_blob(
    State(state): State<ServerState>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let path = BlobPath::new(&raw)?;
    match state.blobs.read(&path).await? {
        Some(bytes) => Ok((
            [(header::CONTENT_TYPE, "application/octet-stream")],
            bytes,
        )),
        None => Err(ApiError::NotFound(format!("no blob at {}", path))),
    }
}

pub async fn download_url(
    State(state): State<ServerState>,
    Path(raw): Path<String>,
) -> Result<Json<DownloadUrlBody>, ApiError> {
    let path = BlobPath::new(&raw)?;
    let download_url = state
        .blobs
        .download_url(&path)
        .await
        .map_err(|e| ApiError::NotFound(e.to_string()))?;
    Ok(Json(DownloadUrlBody { download_url }))
}
