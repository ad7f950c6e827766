use std::sync::Arc;

use tracing::{error, info};

use hermes::broker::Broker;
use hermes::config::load_config;
use hermes::transport::websocket::start_websocket_server;
use hermes::utils::logging;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    logging::init(&config.logging.level);

    let addr = config.server.addr();
    info!("starting hermes websocket server on {}", addr);

    let broker = Arc::new(Broker::new());
    if let Err(e) = start_websocket_server(&addr, broker).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
