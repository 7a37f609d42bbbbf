//! Self-hostable backend for the HTTP document and blob adapters.
//!
//! Routes:
//! - `GET /health`: health check (no auth)
//! - `GET /storage/{path}`: blob contents (no auth, download URLs point here)
//! - `GET|POST /documents/{collection}`: list / create
//! - `PUT|PATCH|DELETE /documents/{collection}/{id}`: set / merge / delete
//! - `PUT /storage/{path}`: store a blob
//! - `GET /download-url/{path}`: durable URL of a stored blob
//!
//! Everything except the first two requires `Authorization: Bearer <key>`.

pub mod auth;
mod blobs;
mod documents;
mod error;

pub use auth::{ApiKeyEntry, ApiKeyStore, AuthUser};
pub use error::ApiError;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::blob::FsBlobStore;
use crate::store::{SqliteDocumentStore, StoreError};

/// Uploaded images may exceed axum's 2 MB default.
const MAX_BLOB_BYTES: usize = 25 * 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Settings {
    /// Port to listen on
    pub port: u16,
    /// Directory holding the document database and blobs
    pub data_dir: PathBuf,
    /// Path to the API key config file
    pub config_path: PathBuf,
    /// Externally reachable base URL, used in download URLs
    pub public_url: String,
}

impl Settings {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let port = std::env::var("BOOKIT_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let data_dir = std::env::var("BOOKIT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("bookit-server")
            });

        let config_path = std::env::var("BOOKIT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("bookit-server")
                    .join("config.yaml")
            });

        let public_url = std::env::var("BOOKIT_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port));

        Self {
            port,
            data_dir,
            config_path,
            public_url,
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct ServerState {
    pub documents: Arc<SqliteDocumentStore>,
    pub blobs: Arc<FsBlobStore>,
    pub api_keys: Arc<ApiKeyStore>,
}

impl ServerState {
    pub fn new(documents: SqliteDocumentStore, blobs: FsBlobStore, api_keys: ApiKeyStore) -> Self {
        Self {
            documents: Arc::new(documents),
            blobs: Arc::new(blobs),
            api_keys: Arc::new(api_keys),
        }
    }

    /// Opens the stores under `data_dir`; blob URLs are served from
    /// `{public_url}/storage`.
    pub async fn open(
        data_dir: &std::path::Path,
        public_url: &str,
        api_keys: ApiKeyStore,
    ) -> Result<Self, StoreError> {
        let documents = SqliteDocumentStore::open(&data_dir.join("bookit.db")).await?;
        let blobs = FsBlobStore::with_public_url(
            data_dir.join("blobs"),
            format!("{}/storage", public_url.trim_end_matches('/')),
        );
        Ok(Self::new(documents, blobs, api_keys))
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint (no auth required)
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Builds the full router with tracing.
pub fn router(state: ServerState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/storage/{*path}", get(blobs::get_blob));

    let protected_routes = Router::new()
        .route(
            "/documents/{*path}",
            get(documents::list_documents)
                .post(documents::create_document)
                .put(documents::set_document)
                .patch(documents::update_document)
                .delete(documents::delete_document),
        )
        .route(
            "/storage/{*path}",
            put(blobs::put_blob).layer(DefaultBodyLimit::max(MAX_BLOB_BYTES)),
        )
        .route("/download-url/{*path}", get(blobs::download_url))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
