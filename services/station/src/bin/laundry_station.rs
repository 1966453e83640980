//! services/station/src/bin/laundry_station.rs

use laundry_core::InventoryStore;
use reqwest::Client;
use station_lib::{
    adapters::{CepApiAdapter, GuestApiAdapter, JsonFileStore, LaundryApiAdapter, SystemClock},
    config::Config,
    console::{ConsoleSession, Services},
    error::StationError,
    outbox::spawn_mirror,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), StationError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    // Logs go to stderr so they never interleave with the counter on stdout.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded. Starting station...");

    // --- 2. Initialize Service Adapters ---
    let client = Client::new();
    let local = Arc::new(JsonFileStore::new(config.state_path.clone()));
    let remote = Arc::new(LaundryApiAdapter::new(client.clone(), &config.api_base_url));
    let address = Arc::new(CepApiAdapter::new(client.clone(), &config.api_base_url));
    let guests = Arc::new(GuestApiAdapter::new(client, &config.api_base_url));
    info!("Local state at {}", local.path().display());

    // --- 3. Start the Mirror Worker & Restore State ---
    let (queue, worker) = spawn_mirror(remote.clone());
    let store = InventoryStore::restore(
        local,
        remote.as_ref(),
        Arc::new(queue),
        Arc::new(SystemClock),
    )
    .await;

    // --- 4. Run the Console Session ---
    let services = Services {
        address,
        guests,
        runtime: tokio::runtime::Handle::current(),
        registration_prompt_delay: config.registration_prompt_delay,
    };
    let session = tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        ConsoleSession::new(store, stdin.lock(), stdout.lock(), services).run()
    });
    let store = session
        .await
        .map_err(|e| StationError::Internal(format!("Console task failed: {}", e)))??;

    // --- 5. Drain the Mirror ---
    // The store holds the last queue handle; dropping it lets the worker finish.
    drop(store);
    info!("Waiting for pending mirror deliveries...");
    worker.shutdown(config.mirror_shutdown_grace).await;
    info!("Station stopped.");

    Ok(())
}
