//! Port for the order-intake queue feeding the ingestion path.

use async_trait::async_trait;

use crate::domain::{Order, OrderId};

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by queue adapters.
    pub enum OrderQueueError {
        /// Queue infrastructure is unavailable.
        Unavailable { message: String } => "order queue is unavailable: {message}",
        /// A message could not be decoded into an order.
        Malformed { message: String } => "order queue message is malformed: {message}",
    }
}

/// Intake queue between the storefront and the order store.
///
/// Consumers take a batch with [`OrderQueue::fetch_orders`] and hand it back
/// with [`OrderQueue::requeue`] when it could not be stored, so a failed
/// ingestion never loses orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderQueue: Send + Sync {
    /// Decode a raw order message and enqueue it as a pending order.
    async fn submit(&self, payload: &[u8]) -> Result<OrderId, OrderQueueError>;

    /// Take every order currently waiting on the queue.
    async fn fetch_orders(&self) -> Result<Vec<Order>, OrderQueueError>;

    /// Return a taken batch to the head of the queue, preserving its order.
    async fn requeue(&self, orders: Vec<Order>) -> Result<(), OrderQueueError>;
}
