//! Order-store adapters for the MongoDB API and the Cosmos DB SQL API.
//!
//! # Architecture
//!
//! - **Thin adapters**: each repository only translates between its stored
//!   document shape and domain types. No business logic resides here.
//! - **Internal documents**: stored shapes and REST plumbing stay private
//!   to this module and never reach the domain layer.
//! - **Fail fast**: [`RepositoryConfig::resolve`] validates settings without
//!   I/O; the factory then connects exactly one backend and verifies it.
//! - **Strongly typed errors**: driver and HTTP failures are mapped to
//!   [`OrderRepositoryError`](crate::domain::ports::OrderRepositoryError).
//!
//! # Example
//!
//! ```ignore
//! use order_service::outbound::persistence::build_order_service;
//!
//! let service = build_order_service(&settings.database).await?;
//! let pending = service.get_pending_orders().await?;
//! ```

mod cosmos;
mod cosmos_order_repository;
mod factory;
mod mongo_order_repository;
mod repository_config;

pub use cosmos::{PartitionKey, PartitionKeyError};
pub use cosmos_order_repository::CosmosOrderRepository;
pub use factory::{RepositoryInitError, build_order_service, connect_order_service};
pub use mongo_order_repository::MongoOrderRepository;
pub use repository_config::{
    AmbientCredentialSource, COSMOS_SQL_API, ConfigError, DatabaseApi, DocumentStoreConfig,
    DocumentStoreCredential, FederatedTokenConfig, PartitionedAuth, PartitionedStoreConfig,
    RepositoryConfig,
};
