//! MongoDB API-backed `OrderRepository` implementation.
//!
//! Orders are stored with `_id` set to the order id, so the primary key index
//! enforces one document per order and duplicate inserts surface as
//! duplicate-key write errors.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::doc;
use mongodb::error::{BulkWriteFailure, Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, Credential, InsertManyOptions};
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::domain::{Order, OrderId, OrderItem, Status};

use super::repository_config::DocumentStoreConfig;

const DUPLICATE_KEY: i32 = 11000;
const APP_NAME: &str = "order-service";

/// Stored shape of an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderDocument {
    #[serde(rename = "_id")]
    id: String,
    order_id: OrderId,
    customer_id: String,
    #[serde(default)]
    items: Vec<OrderItem>,
    status: Status,
}

impl From<&Order> for OrderDocument {
    fn from(order: &Order) -> Self {
        Self {
            id: order.order_id.as_str().to_owned(),
            order_id: order.order_id.clone(),
            customer_id: order.customer_id.clone(),
            items: order.items.clone(),
            status: order.status,
        }
    }
}

impl From<OrderDocument> for Order {
    fn from(document: OrderDocument) -> Self {
        Self {
            order_id: document.order_id,
            customer_id: document.customer_id,
            items: document.items,
            status: document.status,
        }
    }
}

/// Order repository over one MongoDB collection.
#[derive(Debug, Clone)]
pub struct MongoOrderRepository {
    collection: Collection<OrderDocument>,
}

impl MongoOrderRepository {
    /// Parse the URI, apply credentials, and ping the database.
    pub async fn connect(config: DocumentStoreConfig) -> Result<Self, OrderRepositoryError> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|err| OrderRepositoryError::connection(err.to_string()))?;
        options.app_name = Some(APP_NAME.to_owned());
        if let Some(supplied) = &config.credential {
            let mut credential = Credential::default();
            credential.username = Some(supplied.username.clone());
            credential.password = supplied.password.as_ref().map(|p| p.to_string());
            options.credential = Some(credential);
        }

        let client = Client::with_options(options).map_err(map_mongo_error)?;
        let database = client.database(&config.database);
        database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|err| OrderRepositoryError::connection(err.to_string()))?;
        info!(
            database = %config.database,
            collection = %config.collection,
            authenticated = config.credential.is_some(),
            "connected to document store"
        );

        Ok(Self {
            collection: database.collection(&config.collection),
        })
    }
}

#[async_trait]
impl OrderRepository for MongoOrderRepository {
    async fn insert_orders(&self, orders: &[Order]) -> Result<(), OrderRepositoryError> {
        if orders.is_empty() {
            return Ok(());
        }
        let documents: Vec<OrderDocument> = orders.iter().map(OrderDocument::from).collect();
        let mut options = InsertManyOptions::default();
        options.ordered = Some(false);

        match self.collection.insert_many(documents, options).await {
            Ok(_) => Ok(()),
            Err(err) => match duplicate_count(&err) {
                Some(skipped) => {
                    debug!(skipped, "skipping duplicate orders");
                    Ok(())
                }
                None => Err(map_mongo_error(err)),
            },
        }
    }

    async fn get_orders_by_status(
        &self,
        status: Status,
    ) -> Result<Vec<Order>, OrderRepositoryError> {
        let cursor = self
            .collection
            .find(doc! { "status": status.code() }, None)
            .await
            .map_err(map_mongo_error)?;
        let documents: Vec<OrderDocument> = cursor.try_collect().await.map_err(map_mongo_error)?;
        Ok(documents.into_iter().map(Order::from).collect())
    }

    async fn get_order(&self, order_id: &OrderId) -> Result<Order, OrderRepositoryError> {
        self.collection
            .find_one(doc! { "_id": order_id.as_str() }, None)
            .await
            .map_err(map_mongo_error)?
            .map(Order::from)
            .ok_or_else(|| OrderRepositoryError::not_found(order_id.as_str()))
    }

    async fn update_order(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        let result = self
            .collection
            .replace_one(
                doc! { "_id": order.order_id.as_str() },
                OrderDocument::from(order),
                None,
            )
            .await
            .map_err(map_mongo_error)?;
        if result.matched_count == 0 {
            return Err(OrderRepositoryError::not_found(order.order_id.as_str()));
        }
        Ok(())
    }
}

/// Number of rejected writes when every rejection is a duplicate key.
fn duplicate_count(err: &MongoError) -> Option<usize> {
    match err.kind.as_ref() {
        ErrorKind::BulkWrite(BulkWriteFailure {
            write_errors,
            write_concern_error,
            ..
        }) => {
            let codes: Vec<i32> = write_errors
                .iter()
                .flatten()
                .map(|e| e.code)
                .collect();
            duplicates_only(&codes, write_concern_error.is_some())
        }
        ErrorKind::Write(WriteFailure::WriteError(e)) => duplicates_only(&[e.code], false),
        _ => None,
    }
}

/// A failed insert is benign only when it reports at least one write error,
/// all of them duplicate keys, and no write-concern failure.
fn duplicates_only(codes: &[i32], write_concern_failed: bool) -> Option<usize> {
    if write_concern_failed || codes.is_empty() {
        return None;
    }
    codes
        .iter()
        .all(|&code| code == DUPLICATE_KEY)
        .then_some(codes.len())
}

fn map_mongo_error(err: MongoError) -> OrderRepositoryError {
    debug!(error = %err, "document store operation failed");
    match err.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Authentication { .. }
        | ErrorKind::Io(_)
        | ErrorKind::ConnectionPoolCleared { .. }
        | ErrorKind::DnsResolve { .. } => OrderRepositoryError::connection(err.to_string()),
        _ => OrderRepositoryError::query(err.to_string()),
    }
}
