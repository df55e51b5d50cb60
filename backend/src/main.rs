//! Order service entry-point: parses settings, connects the order store, and
//! serves the REST endpoints.

mod server;

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use order_service::outbound::persistence::{RepositoryConfig, connect_order_service};
use order_service::outbound::queue::InMemoryOrderQueue;
use order_service::settings::ServiceSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServiceSettings::parse();

    let config = match RepositoryConfig::resolve(&settings.database) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "order store configuration is invalid");
            std::process::exit(1);
        }
    };
    info!(api = ?config.api(), "order store configuration resolved");

    let orders = match connect_order_service(config).await {
        Ok(orders) => orders,
        Err(err) => {
            error!(error = %err, "failed to initialise order store");
            std::process::exit(1);
        }
    };

    let server = create_server(ServerConfig::new(
        settings.bind_addr,
        orders,
        Arc::new(InMemoryOrderQueue::new()),
        settings.app_version,
    ))?;
    server.await
}
