//! Process configuration assembled once at startup.
//!
//! Every value can be passed as a command-line flag or read from the
//! environment variable named in its `env` attribute. Values are kept as
//! raw optional strings here; `outbound::persistence::RepositoryConfig`
//! decides which ones are required for the selected backend.

use std::fmt;
use std::net::SocketAddr;

use clap::{Args, Parser};

/// Default listener, matching the port the makeline worker expects.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";

/// Top-level settings for the order service binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "order-service", about = "Order management service")]
pub struct ServiceSettings {
    /// Socket address the HTTP server binds to.
    #[arg(long, env = "ORDER_SERVICE_BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
    pub bind_addr: SocketAddr,
    /// Version string reported by the health endpoint.
    #[arg(long, env = "APP_VERSION", default_value = "")]
    pub app_version: String,
    #[command(flatten)]
    pub database: DatabaseSettings,
}

/// Raw order-store settings.
///
/// `Default` yields every value unset, so tests build synthetic settings
/// with struct update syntax instead of touching the process environment.
#[derive(Clone, Default, Args)]
pub struct DatabaseSettings {
    /// Store API selector; `cosmosdbsql` selects the partitioned store.
    #[arg(long = "db-api", env = "ORDER_DB_API")]
    pub api: Option<String>,
    /// Cosmos DB resource endpoint; preferred over `ORDER_DB_URI` when set.
    #[arg(long, env = "AZURE_COSMOS_RESOURCEENDPOINT")]
    pub cosmos_resource_endpoint: Option<String>,
    /// Store connection URI.
    #[arg(long = "db-uri", env = "ORDER_DB_URI")]
    pub uri: Option<String>,
    /// Database (account database) name.
    #[arg(long = "db-name", env = "ORDER_DB_NAME")]
    pub name: Option<String>,
    /// Container name (partitioned store).
    #[arg(long = "db-container-name", env = "ORDER_DB_CONTAINER_NAME")]
    pub container_name: Option<String>,
    /// Partition key property name (partitioned store).
    #[arg(long = "db-partition-key", env = "ORDER_DB_PARTITION_KEY")]
    pub partition_key: Option<String>,
    /// Partition key value (partitioned store).
    #[arg(long = "db-partition-value", env = "ORDER_DB_PARTITION_VALUE")]
    pub partition_value: Option<String>,
    /// Collection name (document store).
    #[arg(long = "db-collection-name", env = "ORDER_DB_COLLECTION_NAME")]
    pub collection_name: Option<String>,
    /// Username (document store).
    #[arg(long = "db-username", env = "ORDER_DB_USERNAME")]
    pub username: Option<String>,
    /// Password (document store) or account key (partitioned store).
    #[arg(long = "db-password", env = "ORDER_DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// `true` selects workload-identity auth for the partitioned store.
    #[arg(long, env = "USE_WORKLOAD_IDENTITY_AUTH")]
    pub use_workload_identity_auth: Option<String>,
    #[command(flatten)]
    pub identity: AmbientIdentitySettings,
}

/// Ambient identity-provider inputs injected by the platform.
///
/// None of these are secrets: the federated token file is projected by the
/// orchestrator and read at token-exchange time.
#[derive(Debug, Clone, Default, Args)]
pub struct AmbientIdentitySettings {
    /// Application (client) id of the workload identity.
    #[arg(long, env = "AZURE_CLIENT_ID")]
    pub azure_client_id: Option<String>,
    /// Directory (tenant) id of the workload identity.
    #[arg(long, env = "AZURE_TENANT_ID")]
    pub azure_tenant_id: Option<String>,
    /// Path of the projected service-account token.
    #[arg(long, env = "AZURE_FEDERATED_TOKEN_FILE")]
    pub azure_federated_token_file: Option<String>,
    /// Identity provider authority host.
    #[arg(long, env = "AZURE_AUTHORITY_HOST")]
    pub azure_authority_host: Option<String>,
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("api", &self.api)
            .field("cosmos_resource_endpoint", &self.cosmos_resource_endpoint)
            .field("uri", &self.uri.as_ref().map(|_| "<set>"))
            .field("name", &self.name)
            .field("container_name", &self.container_name)
            .field("partition_key", &self.partition_key)
            .field("partition_value", &self.partition_value)
            .field("collection_name", &self.collection_name)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("use_workload_identity_auth", &self.use_workload_identity_auth)
            .field("identity", &self.identity)
            .finish()
    }
}
