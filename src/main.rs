mod app;
mod components;
mod config;
mod data;
mod error;
mod events;
mod forms;
mod logging;
mod theme;
mod tx;
mod utils;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use tokio::sync::mpsc;
use tracing::info;

use crate::app::App;
use crate::config::Config;
use crate::data::DataService;
use crate::data::gateway::ContractGateway;
use crate::data::provider::RpcGateway;
use crate::events::AppEvent;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::parse();

    let log_path = logging::init(config.log_file.as_deref(), config.log_level)?;
    info!(path = %log_path.display(), "logging initialised");

    // Connect to the node
    eprintln!("Connecting to {}...", config.rpc_url);
    let gateway = RpcGateway::connect(
        &config.rpc_url,
        config.private_key.as_deref(),
        config.contracts(),
    )
    .await?;
    let chain_id = gateway.chain_id();
    let account = gateway.account();
    match account {
        Some(account) => eprintln!("Connected to chain {chain_id} as {account}"),
        None => eprintln!("Connected to chain {chain_id} (read-only)"),
    }

    // Create event channel
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    // Send initial connected event
    let _ = event_tx.send(AppEvent::Connected { chain_id, account });

    let gateway: Arc<dyn ContractGateway> = Arc::new(gateway);
    let data_service = Arc::new(DataService::new(
        gateway,
        event_tx,
        Duration::from_millis(config.poll_interval_ms),
        Duration::from_secs(config.receipt_timeout_secs),
    ));

    let mut app = App::with_service(
        data_service,
        event_rx,
        &config.explorer_url,
        config.export_dir.clone(),
        config.tick_rate_ms,
    );

    // Initialize terminal
    let terminal = ratatui::init();
    let result = app.run(terminal).await;

    // Restore terminal
    ratatui::restore();

    result
}
