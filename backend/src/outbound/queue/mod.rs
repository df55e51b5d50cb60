//! In-process order queue adapter.
//!
//! Implements the `OrderQueue` port with a FIFO buffer. The running service
//! feeds it through `POST /order/intake`; tests push decoded orders or raw
//! JSON messages directly. `fetch_orders` drains whatever is waiting and
//! `requeue` puts a batch back at the head when it could not be stored.
//! Redelivered orders are absorbed by the repository's duplicate handling.

use std::collections::VecDeque;

use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::ports::{OrderQueue, OrderQueueError};
use crate::domain::{Order, OrderId, OrderItem};

/// Order message as published by the storefront.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderMessage {
    #[serde(default)]
    order_id: Option<String>,
    customer_id: String,
    #[serde(default)]
    items: Vec<OrderItem>,
}

/// FIFO queue held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryOrderQueue {
    pending: Mutex<VecDeque<Order>>,
}

impl InMemoryOrderQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue an already decoded order.
    pub async fn push(&self, order: Order) {
        self.pending.lock().await.push_back(order);
    }

    /// Decode a JSON order message and enqueue it as `Pending`.
    ///
    /// A message without an `orderId` is assigned a random one. Returns the
    /// id the order was queued under.
    ///
    /// # Examples
    /// ```
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// use order_service::domain::Status;
    /// use order_service::domain::ports::OrderQueue;
    /// use order_service::outbound::queue::InMemoryOrderQueue;
    ///
    /// let queue = InMemoryOrderQueue::new();
    /// let id = queue
    ///     .push_message(br#"{"orderId":"007","customerId":"c1","items":[]}"#)
    ///     .await
    ///     .unwrap();
    /// assert_eq!(id.as_str(), "7");
    ///
    /// let orders = queue.fetch_orders().await.unwrap();
    /// assert_eq!(orders[0].status, Status::Pending);
    /// # });
    /// ```
    pub async fn push_message(&self, payload: &[u8]) -> Result<OrderId, OrderQueueError> {
        let message: OrderMessage = serde_json::from_slice(payload)
            .map_err(|err| OrderQueueError::malformed(err.to_string()))?;
        let order_id = match message.order_id.as_deref() {
            Some(raw) => {
                OrderId::parse(raw).map_err(|err| OrderQueueError::malformed(err.to_string()))?
            }
            None => OrderId::from(u64::from(rand::thread_rng().r#gen::<u32>())),
        };
        let order = Order::pending(order_id.clone(), message.customer_id, message.items);
        self.push(order).await;
        debug!(order_id = %order_id, "queued order message");
        Ok(order_id)
    }

    /// Number of orders waiting.
    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// True when nothing is waiting.
    pub async fn is_empty(&self) -> bool {
        self.pending.lock().await.is_empty()
    }
}

#[async_trait]
impl OrderQueue for InMemoryOrderQueue {
    async fn submit(&self, payload: &[u8]) -> Result<OrderId, OrderQueueError> {
        self.push_message(payload).await
    }

    async fn fetch_orders(&self) -> Result<Vec<Order>, OrderQueueError> {
        let drained: Vec<Order> = self.pending.lock().await.drain(..).collect();
        debug!(count = drained.len(), "drained order queue");
        Ok(drained)
    }

    async fn requeue(&self, orders: Vec<Order>) -> Result<(), OrderQueueError> {
        let mut pending = self.pending.lock().await;
        let count = orders.len();
        for order in orders.into_iter().rev() {
            pending.push_front(order);
        }
        debug!(count, "returned orders to the head of the queue");
        Ok(())
    }
}
