//! Login, logout and status commands.

use clap::{Args, Subcommand};
use std::io::{self, Write};

use super::{own_profile, CommandResult};
use bookit::blob::BlobStore;
use bookit::config::Config;
use bookit::credentials::CredentialStore;
use bookit::models::{Identity, UserProfile};
use bookit::store::{Collection, CollectionPath, DocumentStore};
use bookit::sync::BookingClient;

/// Authentication commands
#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand)]
enum AuthSubcommand {
    /// Store credentials and load (or create) your provider profile
    Login {
        /// Account id; also the id of your provider profile
        #[arg(long)]
        user_id: String,

        /// API key, sent to the server as a Bearer token
        #[arg(long)]
        key: String,

        /// Password (prompted for if omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Remove stored credentials
    Logout,
    /// Show authentication status
    Status,
}

impl AuthCommand {
    /// API key given on the command line, if this is a login.
    pub fn login_key(&self) -> Option<String> {
        match &self.command {
            AuthSubcommand::Login { key, .. } => Some(key.clone()),
            _ => None,
        }
    }

    pub async fn run<D, B, C>(
        &self,
        client: &BookingClient<D, B, C>,
        identity: Option<&Identity>,
        config: &Config,
    ) -> CommandResult
    where
        D: DocumentStore,
        B: BlobStore,
        C: CredentialStore,
    {
        match &self.command {
            AuthSubcommand::Login {
                user_id,
                key,
                password,
            } => {
                let password = match password {
                    Some(p) => p.clone(),
                    None => prompt("Password: ")?,
                };
                let identity = Identity::new(user_id, key, password);
                login(client, &identity).await
            }
            AuthSubcommand::Logout => {
                client.logout().await?;
                match identity {
                    Some(identity) => println!("Logged out {}.", identity.id),
                    None => println!("Already logged out."),
                }
                Ok(())
            }
            AuthSubcommand::Status => {
                status(identity, config);
                Ok(())
            }
        }
    }
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Seeds the provider profile on first login, then logs in with it.
async fn login<D, B, C>(client: &BookingClient<D, B, C>, identity: &Identity) -> CommandResult
where
    D: DocumentStore,
    B: BlobStore,
    C: CredentialStore,
{
    let profile = match own_profile(client, identity).await? {
        Some(profile) => profile,
        None => {
            let profile = UserProfile::new(&identity.id);
            let path = CollectionPath::global(&Collection::ServiceProviders)?;
            client
                .documents()
                .set(&path, &identity.id, &profile.to_fields()?)
                .await?;
            tracing::info!(user = %identity.id, "created provider profile");
            profile
        }
    };

    client.login(identity, profile).await?;
    println!("Logged in as {}", identity.id);
    Ok(())
}

fn status(identity: Option<&Identity>, config: &Config) {
    match identity {
        Some(identity) => {
            println!("Logged in as {} (key: {})", identity.id, identity.masked_key())
        }
        None => println!("Not logged in. Run 'bookit auth login' to authenticate."),
    }
    match &config.server.url {
        Some(url) => println!("Backend: {}", url),
        None => println!("Backend: local ({})", config.data_dir.value.display()),
    }
}
