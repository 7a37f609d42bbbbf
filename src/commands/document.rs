//! Generic collection commands for any logical collection name.

use clap::Args;

use super::{require_login, CommandResult, OutputFormat};
use bookit::blob::BlobStore;
use bookit::credentials::CredentialStore;
use bookit::models::Identity;
use bookit::store::{Collection, DocumentStore, Scope};
use bookit::sync::BookingClient;

#[derive(Args)]
pub struct FetchCommand {
    /// Collection name, e.g. appointments, service-providers or pets
    collection: Collection,

    /// Collection scope: global or owned
    #[arg(long, default_value = "global")]
    scope: Scope,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl FetchCommand {
    pub async fn run<D, B, C>(
        &self,
        client: &BookingClient<D, B, C>,
        identity: Option<&Identity>,
    ) -> CommandResult
    where
        D: DocumentStore,
        B: BlobStore,
        C: CredentialStore,
    {
        let identity = require_login(identity)?;
        let records = client
            .fetch_collection(identity, &self.collection, self.scope)
            .await?;

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&records)?);
            }
            OutputFormat::Text => {
                if records.is_empty() {
                    println!("No documents in {} ({}).", self.collection, self.scope);
                }
                for record in &records {
                    println!("{}  {}", record.id, serde_json::to_string(&record.fields)?);
                }
            }
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct DeleteCommand {
    /// Collection name
    collection: Collection,

    /// Document id
    id: String,

    /// Collection scope: global or owned
    #[arg(long, default_value = "global")]
    scope: Scope,
}

impl DeleteCommand {
    pub async fn run<D, B, C>(
        &self,
        client: &BookingClient<D, B, C>,
        identity: Option<&Identity>,
    ) -> CommandResult
    where
        D: DocumentStore,
        B: BlobStore,
        C: CredentialStore,
    {
        let identity = require_login(identity)?;
        client
            .handle_delete(identity, &self.id, &self.collection, self.scope)
            .await?;
        println!("Deleted {}/{}", self.collection, self.id);
        Ok(())
    }
}
