use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use bookit::blob::{BlobStore, FsBlobStore, HttpBlobStore};
use bookit::config::Config;
use bookit::credentials::{CredentialStore, FileCredentialStore};
use bookit::models::Identity;
use bookit::store::{DocumentStore, HttpDocumentStore, SqliteDocumentStore};
use bookit::sync::BookingClient;
use commands::{
    AppointmentCommand, AuthCommand, CommandResult, ConfigCommand, DeleteCommand, FetchCommand,
    ProviderCommand, ServiceCommand,
};

#[derive(Parser)]
#[command(name = "bookit")]
#[command(version)]
#[command(about = "Book and offer services from the command line", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, log out, show status
    Auth(AuthCommand),

    /// Manage appointments
    #[command(name = "appointments")]
    Appointments(AppointmentCommand),

    /// Browse service providers
    #[command(name = "providers")]
    Providers(ProviderCommand),

    /// Manage the service you offer
    Service(ServiceCommand),

    /// List any collection
    Fetch(FetchCommand),

    /// Delete a document from any collection
    Delete(DeleteCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> CommandResult {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    let Some(command) = cli.command else {
        println!("Use --help to see available commands");
        return Ok(());
    };

    if let Commands::Config(cmd) = &command {
        return cmd.run(&config);
    }

    // The identity is read once here and passed to every command.
    let credentials = FileCredentialStore::in_dir(&config.data_dir.value);
    let identity = credentials.load_identity().await?;

    let login_key = match &command {
        Commands::Auth(cmd) => cmd.login_key(),
        _ => None,
    };
    let api_key = login_key
        .or_else(|| config.server.api_key.clone())
        .or_else(|| identity.as_ref().map(|i| i.key.clone()));
    let image_prefix = config.storage.image_prefix.value.clone();

    match &config.server.url {
        Some(url) => {
            tracing::debug!(url = %url, "using remote backend");
            let client = BookingClient::new(
                HttpDocumentStore::new(url, api_key.clone()),
                HttpBlobStore::new(url, api_key),
                credentials,
            )
            .with_image_prefix(image_prefix);
            execute(command, &client, identity.as_ref(), &config).await
        }
        None => {
            tracing::debug!(data_dir = %config.data_dir.value.display(), "using local backend");
            let documents = SqliteDocumentStore::open(&config.database_path()).await?;
            let client = BookingClient::new(
                documents,
                FsBlobStore::new(config.blob_dir()),
                credentials,
            )
            .with_image_prefix(image_prefix);
            execute(command, &client, identity.as_ref(), &config).await
        }
    }
}

async fn execute<D, B, C>(
    command: Commands,
    client: &BookingClient<D, B, C>,
    identity: Option<&Identity>,
    config: &Config,
) -> CommandResult
where
    D: DocumentStore,
    B: BlobStore,
    C: CredentialStore,
{
    match command {
        Commands::Auth(cmd) => cmd.run(client, identity, config).await,
        Commands::Appointments(cmd) => cmd.run(client, identity).await,
        Commands::Providers(cmd) => cmd.run(client, identity).await,
        Commands::Service(cmd) => cmd.run(client, identity).await,
        Commands::Fetch(cmd) => cmd.run(client, identity).await,
        Commands::Delete(cmd) => cmd.run(client, identity).await,
        Commands::Config(cmd) => cmd.run(config),
    }
}
