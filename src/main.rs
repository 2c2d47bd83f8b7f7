use std::path::PathBuf;
use std::sync::Arc;

use discord_push_relay::dispatch::DiscordClient;
use discord_push_relay::error::RelayError;
use discord_push_relay::logging::{FileLogger, setup_logging};
use discord_push_relay::{AppState, api, load_config};
use tracing::info;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8888";
const DEFAULT_CONFIG_PATH: &str = "relay_config.toml";

async fn run() -> Result<(), RelayError> {
    let bind_address =
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string());
    let config_path =
        std::env::var("RELAY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let file_logger = std::env::var("LOG_DIR")
        .ok()
        .map(|dir| FileLogger::new(PathBuf::from(dir)));

    let _log_guard = setup_logging(file_logger.as_ref())?;

    let config = load_config(&config_path)?;
    let deliverer = DiscordClient::new()
        .map_err(|e| RelayError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
    let state = AppState::from_config(&config, |key| std::env::var(key).ok(), Arc::new(deliverer))?;

    info!("Loaded {} route(s) from {:?}", state.routes.len(), config_path);
    let app = api::build_router(Arc::new(state));

    info!("Listening on {}", bind_address);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    if let Err(e) = run().await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
