//! Cosmos DB SQL API-backed `OrderRepository` implementation.
//!
//! Documents live in one partition, chosen at startup. Each stored document
//! carries the order fields, a string `id` equal to the order id, and the
//! partition field set to the configured value.

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt, stream};
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::domain::{Order, OrderId, Status};

use super::cosmos::{
    CosmosClient, CosmosCredential, CosmosError, CreateOutcome, PartitionKey,
    PartitionScopedQuery, ReplaceOutcome,
};
use super::repository_config::PartitionedStoreConfig;

const MAX_IN_FLIGHT_INSERTS: usize = 8;

/// Order repository bound to one Cosmos container and partition.
#[derive(Debug)]
pub struct CosmosOrderRepository {
    client: CosmosClient,
    partition_key: PartitionKey,
}

impl CosmosOrderRepository {
    /// Build the client and verify the container is reachable.
    pub async fn connect(config: PartitionedStoreConfig) -> Result<Self, OrderRepositoryError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("order-service/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| OrderRepositoryError::connection(err.to_string()))?;
        let credential = CosmosCredential::from_auth(config.auth, &config.endpoint, http.clone());
        let client = CosmosClient::new(
            http,
            config.endpoint,
            config.database,
            config.container,
            credential,
        );

        client.read_container().await.map_err(map_cosmos_error)?;
        info!(
            auth = client.credential().strategy(),
            partition_key = config.partition_key.name(),
            "connected to cosmos container"
        );

        Ok(Self {
            client,
            partition_key: config.partition_key,
        })
    }

    async fn insert_one(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        let document = to_document(order, &self.partition_key)?;
        match self
            .client
            .create_document(&self.partition_key, &document)
            .await
            .map_err(map_cosmos_error)?
        {
            CreateOutcome::Created => Ok(()),
            CreateOutcome::AlreadyExists => {
                debug!(order_id = %order.order_id, "skipping duplicate order");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl OrderRepository for CosmosOrderRepository {
    async fn insert_orders(&self, orders: &[Order]) -> Result<(), OrderRepositoryError> {
        let inserts: Vec<_> = orders.iter().map(|order| self.insert_one(order)).collect();
        stream::iter(inserts)
            .buffer_unordered(MAX_IN_FLIGHT_INSERTS)
            .try_collect::<Vec<()>>()
            .await?;
        Ok(())
    }

    async fn get_orders_by_status(
        &self,
        status: Status,
    ) -> Result<Vec<Order>, OrderRepositoryError> {
        let query = PartitionScopedQuery::new(&self.partition_key).with_equals("status", status.code());
        let documents = self
            .client
            .query_documents(&query)
            .await
            .map_err(map_cosmos_error)?;
        documents.into_iter().map(from_document).collect()
    }

    async fn get_order(&self, order_id: &OrderId) -> Result<Order, OrderRepositoryError> {
        self.client
            .read_document(&self.partition_key, order_id.as_str())
            .await
            .map_err(map_cosmos_error)?
            .map_or_else(
                || Err(OrderRepositoryError::not_found(order_id.as_str())),
                from_document,
            )
    }

    async fn update_order(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        let document = to_document(order, &self.partition_key)?;
        match self
            .client
            .replace_document(&self.partition_key, order.order_id.as_str(), &document)
            .await
            .map_err(map_cosmos_error)?
        {
            ReplaceOutcome::Replaced => Ok(()),
            ReplaceOutcome::Missing => Err(OrderRepositoryError::not_found(order.order_id.as_str())),
        }
    }
}

fn to_document(order: &Order, partition: &PartitionKey) -> Result<Value, OrderRepositoryError> {
    let mut document =
        serde_json::to_value(order).map_err(|err| OrderRepositoryError::query(err.to_string()))?;
    let Some(fields) = document.as_object_mut() else {
        return Err(OrderRepositoryError::query("order did not serialise to an object"));
    };
    fields.insert("id".to_owned(), Value::from(order.order_id.as_str()));
    fields.insert(partition.name().to_owned(), Value::from(partition.value()));
    Ok(document)
}

fn from_document(document: Value) -> Result<Order, OrderRepositoryError> {
    serde_json::from_value(document)
        .map_err(|err| OrderRepositoryError::query(format!("stored order is malformed: {err}")))
}

fn map_cosmos_error(err: CosmosError) -> OrderRepositoryError {
    debug!(error = %err, "cosmos operation failed");
    if err.is_connection() {
        OrderRepositoryError::connection(err.to_string())
    } else {
        OrderRepositoryError::query(err.to_string())
    }
}
