use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use topichub::broker::TopicBroker;
use topichub::broker::reaper::run_reaper;
use topichub::config::load_config;
use topichub::transport::websocket::start_websocket_server;
use topichub::utils::logging;

#[tokio::main]
async fn main() {
    logging::init("info");

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return;
        }
    };
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let broker = Arc::new(TopicBroker::new());

    let shutdown = CancellationToken::new();
    tokio::spawn(run_reaper(
        broker.clone(),
        Duration::from_secs(config.broker.reaper_interval_secs),
        shutdown.clone(),
    ));

    tokio::select! {
        _ = start_websocket_server(&addr, broker) => {
            error!("WebSocket server exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    shutdown.cancel();
}
