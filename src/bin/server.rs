//! Bookit Server
//!
//! A self-hostable document and blob backend for the bookit client.
//!
//! # Configuration
//!
//! Environment variables:
//! - `BOOKIT_PORT`: Port to listen on (default: 8080)
//! - `BOOKIT_DATA_DIR`: Directory for the database and blobs (default: ~/.local/share/bookit-server)
//! - `BOOKIT_CONFIG`: Path to config file (default: ~/.config/bookit-server/config.yaml)
//! - `BOOKIT_PUBLIC_URL`: Base URL used in download URLs (default: http://localhost:<port>)
//!
//! # Config File Format
//!
//! ```yaml
//! api_keys:
//!   - key: "your-secret-key-here"
//!     user_id: "user1"
//! ```

use bookit::server::{router, ApiKeyStore, ServerState, Settings};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookit=info,bookit_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env();

    std::fs::create_dir_all(&settings.data_dir)?;
    tracing::info!("Data directory: {}", settings.data_dir.display());
    tracing::info!("Config file: {}", settings.config_path.display());
    tracing::info!("Public URL: {}", settings.public_url);

    let api_keys = ApiKeyStore::load(&settings.config_path);
    let state = ServerState::open(&settings.data_dir, &settings.public_url, api_keys).await?;
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
