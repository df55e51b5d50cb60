//! Startup selection of the order-store backend.
//!
//! Exactly one backend is constructed per process. Configuration problems
//! are reported before any network I/O; connection problems are reported
//! before a service is returned.

use std::sync::Arc;

use tracing::info;

use crate::domain::OrderService;
use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::settings::DatabaseSettings;

use super::cosmos_order_repository::CosmosOrderRepository;
use super::mongo_order_repository::MongoOrderRepository;
use super::repository_config::{ConfigError, DatabaseApi, PartitionedAuth, RepositoryConfig};

/// Why the order store could not be initialised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryInitError {
    /// Settings were missing or invalid for the selected backend.
    #[error("order store configuration is invalid: {0}")]
    Config(#[from] ConfigError),
    /// The backend was selected but could not be reached or authenticated.
    #[error("order store backend failed to start: {0}")]
    Backend(#[from] OrderRepositoryError),
}

/// Resolve settings and connect the selected backend.
pub async fn build_order_service(
    settings: &DatabaseSettings,
) -> Result<OrderService, RepositoryInitError> {
    let config = RepositoryConfig::resolve(settings)?;
    connect_order_service(config).await
}

/// Connect an already resolved configuration.
pub async fn connect_order_service(
    config: RepositoryConfig,
) -> Result<OrderService, RepositoryInitError> {
    let repository: Arc<dyn OrderRepository> = match config {
        RepositoryConfig::Partitioned(config) => {
            info!(
                api = api_label(DatabaseApi::CosmosSql),
                auth = auth_label(&config.auth),
                database = %config.database,
                container = %config.container,
                "initialising order store"
            );
            Arc::new(CosmosOrderRepository::connect(config).await?)
        }
        RepositoryConfig::Document(config) => {
            info!(
                api = api_label(DatabaseApi::MongoDb),
                auth = if config.credential.is_some() { "password" } else { "uri" },
                database = %config.database,
                collection = %config.collection,
                "initialising order store"
            );
            Arc::new(MongoOrderRepository::connect(config).await?)
        }
    };
    Ok(OrderService::new(repository))
}

fn api_label(api: DatabaseApi) -> &'static str {
    match api {
        DatabaseApi::CosmosSql => "cosmosdb-sql",
        DatabaseApi::MongoDb => "mongodb",
    }
}

fn auth_label(auth: &PartitionedAuth) -> &'static str {
    match auth {
        PartitionedAuth::SharedKey { .. } => "shared-key",
        PartitionedAuth::WorkloadIdentity(_) => "workload-identity",
    }
}
