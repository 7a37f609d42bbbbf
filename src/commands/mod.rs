mod appointment;
mod auth;
mod config_cmd;
mod document;
mod provider;
mod service;

pub use appointment::AppointmentCommand;
pub use auth::AuthCommand;
pub use config_cmd::ConfigCommand;
pub use document::{DeleteCommand, FetchCommand};
pub use provider::ProviderCommand;
pub use service::ServiceCommand;

use clap::ValueEnum;

use bookit::blob::BlobStore;
use bookit::credentials::CredentialStore;
use bookit::models::{Identity, UserProfile};
use bookit::store::{Collection, DocumentStore, Scope};
use bookit::sync::{BookingClient, SyncError};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// The stored identity, or an error telling the user to log in.
pub fn require_login(identity: Option<&Identity>) -> Result<&Identity, Box<dyn std::error::Error>> {
    identity.ok_or_else(|| "Not logged in. Run 'bookit auth login' first.".into())
}

/// Loads the provider list and returns the identity's own profile, if any.
pub async fn own_profile<D, B, C>(
    client: &BookingClient<D, B, C>,
    identity: &Identity,
) -> Result<Option<UserProfile>, SyncError>
where
    D: DocumentStore,
    B: BlobStore,
    C: CredentialStore,
{
    client
        .fetch_collection(identity, &Collection::ServiceProviders, Scope::Global)
        .await?;
    Ok(client
        .state()
        .service_providers
        .iter()
        .find(|p| p.id == identity.id)
        .cloned())
}
