//! `/documents/{path}` handlers.
//!
//! An odd number of segments addresses a collection, an even number a
//! single document inside it.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;

use super::auth::AuthUser;
use super::{ApiError, ServerState};
use crate::models::Fields;
use crate::store::{validate_segment, Collection, CollectionPath, DocumentStore};

#[derive(Debug, Serialize)]
pub struct DocumentBody {
    id: String,
    data: Fields,
}

#[derive(Debug, Serialize)]
pub struct CreatedBody {
    id: String,
}

enum Target {
    Collection(CollectionPath),
    Document(CollectionPath, String),
}

fn parse_target(raw: &str) -> Result<Target, ApiError> {
    let mut segments: Vec<String> = raw.split('/').map(str::to_string).collect();
    if segments.len() % 2 == 1 {
        return Ok(Target::Collection(CollectionPath::from_segments(segments)?));
    }
    let id = segments.pop().unwrap_or_default();
    validate_segment(&id)?;
    Ok(Target::Document(CollectionPath::from_segments(segments)?, id))
}

/// Only the owner may touch collections under `users/{id}/`.
fn authorize(user: &AuthUser, path: &CollectionPath) -> Result<(), ApiError> {
    match path.segments() {
        [root, owner, ..] if root.as_str() == Collection::Users.name() && *owner != user.user_id => {
            Err(ApiError::Forbidden(format!(
                "{} may not access {}",
                user.user_id, path
            )))
        }
        _ => Ok(()),
    }
}

/// Profile documents (`users/{id}`, `service-providers/{id}`) are written
/// only by the user they describe.
fn authorize_write(user: &AuthUser, path: &CollectionPath, id: &str) -> Result<(), ApiError> {
    let is_profile = match path.segments() {
        [root] => {
            root.as_str() == Collection::Users.name()
                || root.as_str() == Collection::ServiceProviders.name()
        }
        _ => false,
    };
    if is_profile && id != user.user_id {
        return Err(ApiError::Forbidden(format!(
            "{} may not modify {}/{}",
            user.user_id, path, id
        )));
    }
    Ok(())
}

fn collection(user: &AuthUser, raw: &str) -> Result<CollectionPath, ApiError> {
    match parse_target(raw)? {
        Target::Collection(path) => {
            authorize(user, &path)?;
            Ok(path)
        }
        Target::Document(..) => Err(ApiError::BadRequest(format!(
            "'{}' is a document path, expected a collection",
            raw
        ))),
    }
}

fn document(user: &AuthUser, raw: &str) -> Result<(CollectionPath, String), ApiError> {
    match parse_target(raw)? {
        Target::Document(path, id) => {
            authorize(user, &path)?;
            Ok((path, id))
        }
        Target::Collection(_) => Err(ApiError::BadRequest(format!(
            "'{}' is a collection path, expected a document",
            raw
        ))),
    }
}

fn writable_document(user: &AuthUser, raw: &str) -> Result<(CollectionPath, String), ApiError> {
    let (path, id) = document(user, raw)?;
    authorize_write(user, &path, &id)?;
    Ok((path, id))
}

pub async fn list_documents(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Path(raw): Path<String>,
) -> Result<Json<Vec<DocumentBody>>, ApiError> {
    let path = collection(&user, &raw)?;
    let records = state.documents.list(&path).await?;
    Ok(Json(
        records
            .into_iter()
            .map(|r| DocumentBody {
                id: r.id,
                data: r.fields,
            })
            .collect(),
    ))
}

pub async fn create_document(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Path(raw): Path<String>,
    Json(data): Json<Fields>,
) -> Result<(StatusCode, Json<CreatedBody>), ApiError> {
    let path = collection(&user, &raw)?;
    let id = state.documents.create(&path, &data).await?;
    tracing::info!(user = %user.user_id, path = %path, id = %id, "created document");
    Ok((StatusCode::CREATED, Json(CreatedBody { id })))
}

pub async fn set_document(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Path(raw): Path<String>,
    Json(data): Json<Fields>,
) -> Result<StatusCode, ApiError> {
    let (path, id) = writable_document(&user, &raw)?;
    state.documents.set(&path, &id, &data).await?;
    tracing::info!(user = %user.user_id, path = %path, id = %id, "set document");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_document(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Path(raw): Path<String>,
    Json(patch): Json<Fields>,
) -> Result<StatusCode, ApiError> {
    let (path, id) = writable_document(&user, &raw)?;
    state.documents.update(&path, &id, &patch).await?;
    tracing::info!(user = %user.user_id, path = %path, id = %id, "updated document");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_document(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Path(raw): Path<String>,
) -> Result<StatusCode, ApiError> {
    let (path, id) = writable_document(&user, &raw)?;
    state.documents.delete(&path, &id).await?;
    tracing::info!(user = %user.user_id, path = %path, id = %id, "deleted document");
    Ok(StatusCode::NO_CONTENT)
}
