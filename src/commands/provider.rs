use clap::{Args, Subcommand};

use super::{require_login, CommandResult, OutputFormat};
use bookit::blob::BlobStore;
use bookit::credentials::CredentialStore;
use bookit::models::Identity;
use bookit::store::{Collection, DocumentStore, Scope};
use bookit::sync::BookingClient;

#[derive(Args)]
pub struct ProviderCommand {
    #[command(subcommand)]
    pub command: ProviderSubcommand,
}

#[derive(Subcommand)]
pub enum ProviderSubcommand {
    /// List service providers and what they offer
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ProviderCommand {
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

        match &self.command {
            ProviderSubcommand::List { format } => {
                client
                    .fetch_collection(identity, &Collection::ServiceProviders, Scope::Global)
                    .await?;
                let providers = client.state().service_providers;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(providers.as_ref())?);
                    }
                    OutputFormat::Text => {
                        if providers.is_empty() {
                            println!("No service providers found.");
                        }
                        for provider in providers.iter() {
                            println!("{}", provider);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
