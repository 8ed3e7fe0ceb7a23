use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::signal;

use booking_chat::auth::StaticTokenVerifier;
use booking_chat::config;
use booking_chat::history::HistoryApi;
use booking_chat::network::{ChatServer, SessionGateway};
use booking_chat::presence::PresenceRegistry;
use booking_chat::router::MessageRouter;
use booking_chat::storage::{self, MessageStore};

#[derive(Parser)]
#[command(name = "booking-chat", version, about = "Chat service for the booking platform")]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Override the listen address from the config file
    #[arg(long, value_name = "ADDR")]
    listen: Option<String>,
    /// Override the database path from the config file
    #[arg(long, value_name = "PATH")]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mut app_config = config::load_config(&cli.config);
    if let Some(listen) = cli.listen {
        app_config.listen_addr = listen;
    }
    if let Some(database) = cli.database {
        app_config.database_path = database;
    }
    if app_config.tokens.is_empty() {
        log::warn!("No identity tokens configured; every connection will be refused");
    }

    storage::ensure_parent_dir(&app_config.database_path)?;
    let store = Arc::new(MessageStore::with_path(&app_config.database_path)?);
    let presence = PresenceRegistry::new();
    let router = Arc::new(MessageRouter::new(store.clone(), presence.clone()));
    let verifier = Arc::new(StaticTokenVerifier::new(app_config.tokens.clone()));
    let gateway = Arc::new(SessionGateway::new(verifier, presence, router));
    let history = Arc::new(HistoryApi::new(store));

    let server = ChatServer::bind(&app_config.listen_addr, gateway, history).await?;

    tokio::select! {
        result = server.run() => {
            if let Err(err) = result {
                log::error!("Chat server terminated unexpectedly: {err}");
            }
        }
        _ = signal::ctrl_c() => {
            log::info!("Received shutdown signal, stopping chat server...");
        }
    }

    Ok(())
}
