//! Thunks: remote I/O first, then a plain action dispatched on success.
//!
//! No thunk dispatches after a failed step, and no thunk swallows an error:
//! every failure is logged and returned to the caller.

use crate::blob::{self, BlobError, BlobPath, BlobStore, ResourceFetcher};
use crate::credentials::CredentialStore;
use crate::models::{Appointment, Fields, Identity, Record, Service, UserProfile};
use crate::state::{Action, AppState, Store};
use crate::store::{Collection, CollectionPath, DocumentStore, Scope};

use super::dispatch::{self, EntityKind};
use super::SyncError;

/// Blob path prefix for service images.
pub const DEFAULT_IMAGE_PREFIX: &str = "product_images";

/// Ties the adapters to the state container.
pub struct BookingClient<D, B, C> {
    documents: D,
    blobs: B,
    credentials: C,
    fetcher: ResourceFetcher,
    store: Store,
    image_prefix: String,
}

impl<D, B, C> BookingClient<D, B, C>
where
    D: DocumentStore,
    B: BlobStore,
    C: CredentialStore,
{
    pub fn new(documents: D, blobs: B, credentials: C) -> Self {
        Self {
            documents,
            blobs,
            credentials,
            fetcher: ResourceFetcher::new(),
            store: Store::new(),
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
        }
    }

    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.image_prefix = prefix.into();
        self
    }

    pub fn with_fetcher(mut self, fetcher: ResourceFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn state(&self) -> AppState {
        self.store.state()
    }

    pub fn documents(&self) -> &D {
        &self.documents
    }

    pub fn credentials(&self) -> &C {
        &self.credentials
    }

    /// Reads the persisted identity. Callers look it up once and pass it on.
    pub async fn current_identity(&self) -> Result<Option<Identity>, SyncError> {
        Ok(self.credentials.load_identity().await?)
    }

    /// Persists the credentials, then dispatches LOGIN.
    pub async fn login(&self, identity: &Identity, user: UserProfile) -> Result<AppState, SyncError> {
        self.credentials
            .save_identity(identity)
            .await
            .inspect_err(|e| tracing::warn!("Failed to store credentials: {}", e))?;
        tracing::info!(user = %identity.id, "logged in");
        Ok(self.store.dispatch(Action::Login { user }))
    }

    /// Clears every stored credential, then dispatches LOGGED_OUT.
    ///
    /// If the credentials cannot all be removed, the logged-in state is kept.
    pub async fn logout(&self) -> Result<AppState, SyncError> {
        self.credentials
            .clear_identity()
            .await
            .inspect_err(|e| tracing::warn!("Failed to clear credentials: {}", e))?;
        tracing::info!("logged out");
        Ok(self.store.dispatch(Action::LoggedOut))
    }

    pub fn set_user_profile(&self, profile: UserProfile) -> AppState {
        self.store.dispatch(Action::SetUserProfile(profile))
    }

    /// Patches the provider profile `user_id`, then dispatches USER_PROFILE
    /// with the patch merged onto the locally known profile.
    ///
    /// The store is not re-read after the update.
    pub async fn update_service_provider_profile(
        &self,
        user_id: &str,
        patch: Fields,
    ) -> Result<UserProfile, SyncError> {
        let base = self
            .store
            .state()
            .current_profile()
            .filter(|p| p.id == user_id)
            .cloned()
            .unwrap_or_else(|| UserProfile::new(user_id));
        let merged = base
            .merged(&patch)
            .map_err(|e| SyncError::InvalidPatch(e.to_string()))?;

        let path = CollectionPath::global(&Collection::ServiceProviders)?;
        self.documents
            .update(&path, user_id, &patch)
            .await
            .inspect_err(|e| tracing::warn!(user = user_id, "Failed to update profile: {}", e))?;

        tracing::info!(user = user_id, "updated service provider profile");
        self.store.dispatch(Action::SetUserProfile(merged.clone()));
        Ok(merged)
    }

    /// Loads the appointments booked with the current identity.
    pub async fn get_appointments_for_service_provider(
        &self,
        identity: &Identity,
    ) -> Result<Vec<Appointment>, SyncError> {
        let path = CollectionPath::global(&Collection::Appointments)?;
        let records = self
            .documents
            .list(&path)
            .await
            .inspect_err(|e| tracing::warn!("Failed to fetch appointments: {}", e))?;

        // Other providers' records are never decoded.
        let records: Vec<Record> = records
            .into_iter()
            .filter(|r| r.get_str("service_provider") == Some(identity.id.as_str()))
            .collect();
        let mine: Vec<Appointment> = dispatch::decode_all(EntityKind::Appointment, records)?;

        self.store
            .dispatch(Action::AppointmentsFetchSuccess(mine.clone()));
        Ok(mine)
    }

    /// Lists a collection and, if it feeds a slice, replaces that slice.
    pub async fn fetch_collection(
        &self,
        identity: &Identity,
        collection: &Collection,
        scope: Scope,
    ) -> Result<Vec<Record>, SyncError> {
        let path = CollectionPath::resolve(collection, scope, identity)?;
        let records = self
            .documents
            .list(&path)
            .await
            .inspect_err(|e| tracing::warn!(path = %path, "Failed to fetch collection: {}", e))?;

        match EntityKind::of(collection) {
            Some(kind) => {
                let action = dispatch::fetched(kind, records.clone())?;
                self.store.dispatch(action);
            }
            None => tracing::debug!(path = %path, "no slice for collection, not dispatching"),
        }
        Ok(records)
    }

    /// Creates a document and appends it to the matching slice.
    pub async fn add_entity(
        &self,
        identity: &Identity,
        collection: &Collection,
        scope: Scope,
        data: Fields,
    ) -> Result<Record, SyncError> {
        let path = CollectionPath::resolve(collection, scope, identity)?;
        let id = self
            .documents
            .create(&path, &data)
            .await
            .inspect_err(|e| tracing::warn!(path = %path, "Failed to create document: {}", e))?;
        let record = Record::from_document(id, data);

        if let Some(kind) = EntityKind::of(collection) {
            self.store.dispatch(dispatch::added(kind, record.clone())?);
        }
        Ok(record)
    }

    /// Patches a document and replaces the matching slice element.
    ///
    /// Returns the element as now known locally: the patch merged over the
    /// slice's copy, or the bare patch if the slice did not hold it.
    pub async fn edit_entity(
        &self,
        identity: &Identity,
        collection: &Collection,
        scope: Scope,
        id: &str,
        patch: Fields,
    ) -> Result<Record, SyncError> {
        let kind = EntityKind::of(collection);
        let current = kind.and_then(|kind| self.local_record(kind, id));
        let record = match current {
            Some(current) => current.merged(&patch),
            None => Record::from_document(id, patch.clone()),
        };
        // Validate the edited element before touching the backend.
        let action = kind
            .map(|kind| dispatch::edited(kind, record.clone()))
            .transpose()?;

        let path = CollectionPath::resolve(collection, scope, identity)?;
        self.documents
            .update(&path, id, &patch)
            .await
            .inspect_err(|e| tracing::warn!(path = %path, id, "Failed to update document: {}", e))?;

        if let Some(action) = action {
            self.store.dispatch(action);
        }
        Ok(record)
    }

    /// Deletes a document and removes it from the matching slice.
    pub async fn handle_delete(
        &self,
        identity: &Identity,
        item_id: &str,
        collection: &Collection,
        scope: Scope,
    ) -> Result<(), SyncError> {
        let path = CollectionPath::resolve(collection, scope, identity)?;
        self.documents
            .delete(&path, item_id)
            .await
            .inspect_err(|e| tracing::warn!(path = %path, id = item_id, "Failed to delete document: {}", e))?;

        match EntityKind::of(collection) {
            Some(kind) => {
                self.store
                    .dispatch(dispatch::deleted(kind, item_id.to_string()));
            }
            None => tracing::debug!(path = %path, "no slice for collection, not dispatching"),
        }
        Ok(())
    }

    /// Uploads the resource at `local_uri` as the identity's service image.
    ///
    /// Returns the download URL; nothing is dispatched.
    pub async fn upload_image_async(
        &self,
        identity: &Identity,
        local_uri: &str,
    ) -> Result<String, SyncError> {
        // `{prefix}/{id}`; the server only accepts uploads whose second
        // segment is the caller, so the prefix must be a single segment.
        if self.image_prefix.trim_matches('/').contains('/') {
            return Err(BlobError::InvalidPath(self.image_prefix.clone()).into());
        }
        let destination = BlobPath::new(&self.image_prefix)?.join(&identity.id)?;
        let url = blob::upload(&self.blobs, &self.fetcher, local_uri, &destination)
            .await
            .inspect_err(|e| tracing::warn!("Image upload failed: {}", e))?;
        Ok(url)
    }

    /// Saves the offered service onto the identity's profile, uploading
    /// `image` first when given. Nothing is dispatched if any step fails.
    pub async fn save_service(
        &self,
        identity: &Identity,
        mut service: Service,
        image: Option<&str>,
    ) -> Result<UserProfile, SyncError> {
        if let Some(uri) = image {
            service.image_url = Some(self.upload_image_async(identity, uri).await?);
        }

        let value =
            serde_json::to_value(&service).map_err(|e| SyncError::InvalidPatch(e.to_string()))?;
        let mut patch = Fields::new();
        patch.insert("service".to_string(), value);

        self.update_service_provider_profile(&identity.id, patch)
            .await
    }

    fn local_record(&self, kind: EntityKind, id: &str) -> Option<Record> {
        let state = self.store.state();
        match kind {
            EntityKind::Appointment => state
                .appointments
                .iter()
                .find(|a| a.id == id)
                .and_then(dispatch::to_record),
            EntityKind::ServiceProvider => state
                .service_providers
                .iter()
                .find(|p| p.id == id)
                .and_then(dispatch::to_record),
        }
    }
}
