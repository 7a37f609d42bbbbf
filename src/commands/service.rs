use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::{own_profile, require_login, CommandResult, OutputFormat};
use bookit::blob::BlobStore;
use bookit::credentials::CredentialStore;
use bookit::models::{Identity, Service};
use bookit::store::DocumentStore;
use bookit::sync::BookingClient;

#[derive(Args)]
pub struct ServiceCommand {
    #[command(subcommand)]
    pub command: ServiceSubcommand,
}

#[derive(Subcommand)]
pub enum ServiceSubcommand {
    /// Show the service you offer
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Set the service you offer
    Set {
        /// Service name
        #[arg(long)]
        name: Option<String>,

        /// Service description
        #[arg(long)]
        description: Option<String>,

        /// Price
        #[arg(long)]
        price: Option<f64>,

        /// Image to upload (local path, file:// or http(s):// URL)
        #[arg(long)]
        image: Option<PathBuf>,
    },
}

impl ServiceCommand {
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
        let profile = own_profile(client, identity).await?;
        if let Some(profile) = &profile {
            client.set_user_profile(profile.clone());
        }

        match &self.command {
            ServiceSubcommand::Show { format } => {
                let service = profile.and_then(|p| p.service);
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&service)?);
                    }
                    OutputFormat::Text => match service {
                        Some(service) => print_service(&service),
                        None => println!("No service set. Run 'bookit service set' to add one."),
                    },
                }
            }
            ServiceSubcommand::Set {
                name,
                description,
                price,
                image,
            } => {
                // Unset flags keep the current values.
                let mut service = profile.and_then(|p| p.service).unwrap_or_default();
                if let Some(name) = name {
                    service.name = name.clone();
                }
                if let Some(description) = description {
                    service.description = description.clone();
                }
                if let Some(price) = price {
                    service.price = Some(*price);
                }

                if let Err(errors) = service.validate() {
                    for error in &errors {
                        eprintln!("  {}", error);
                    }
                    return Err("Service form is invalid".into());
                }

                let image = image.as_ref().map(|p| p.to_string_lossy().into_owned());
                let updated = client
                    .save_service(identity, service, image.as_deref())
                    .await?;
                println!("Service saved.");
                if let Some(service) = &updated.service {
                    print_service(service);
                }
            }
        }
        Ok(())
    }
}

fn print_service(service: &Service) {
    println!("{}", service.name);
    if let Some(price) = service.price {
        println!("  Price: {:.2}", price);
    }
    if !service.description.is_empty() {
        println!("  {}", service.description);
    }
    if let Some(url) = &service.image_url {
        println!("  Image: {}", url);
    }
}
