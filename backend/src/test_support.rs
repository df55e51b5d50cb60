//! Test utilities for the order service crate.
//!
//! Compiled for unit tests and, through the `test-support` feature, for
//! integration tests in `tests/`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::domain::{Order, OrderId, Status};

/// In-memory `OrderRepository` honouring the same contract as the real
/// backends: duplicate-tolerant inserts, exact status filters, and
/// distinguishable not-found results.
///
/// # Examples
///
/// ```rust
/// use order_service::domain::ports::OrderRepository;
/// use order_service::domain::{Order, OrderId};
/// use order_service::test_support::InMemoryOrderRepository;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let repo = InMemoryOrderRepository::default();
/// let order = Order::pending(OrderId::from(7), "c1", Vec::new());
/// repo.insert_orders(&[order.clone(), order]).await?;
/// assert_eq!(repo.get_pending_orders().await?.len(), 1);
/// # Ok::<(), order_service::domain::ports::OrderRepositoryError>(())
/// # }).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<BTreeMap<OrderId, Order>>,
}

impl InMemoryOrderRepository {
    /// Seed the repository with existing orders.
    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let orders = orders
            .into_iter()
            .map(|order| (order.order_id.clone(), order))
            .collect();
        Self {
            orders: RwLock::new(orders),
        }
    }

    /// Number of stored orders.
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    /// True when nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert_orders(&self, orders: &[Order]) -> Result<(), OrderRepositoryError> {
        let mut stored = self.orders.write().await;
        for order in orders {
            stored
                .entry(order.order_id.clone())
                .or_insert_with(|| order.clone());
        }
        Ok(())
    }

    async fn get_orders_by_status(
        &self,
        status: Status,
    ) -> Result<Vec<Order>, OrderRepositoryError> {
        let stored = self.orders.read().await;
        Ok(stored
            .values()
            .filter(|order| order.status == status)
            .cloned()
            .collect())
    }

    async fn get_order(&self, order_id: &OrderId) -> Result<Order, OrderRepositoryError> {
        self.orders
            .read()
            .await
            .get(order_id)
            .cloned()
            .ok_or_else(|| OrderRepositoryError::not_found(order_id.as_str()))
    }

    async fn update_order(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        let mut stored = self.orders.write().await;
        match stored.get_mut(&order.order_id) {
            Some(existing) => {
                *existing = order.clone();
                Ok(())
            }
            None => Err(OrderRepositoryError::not_found(order.order_id.as_str())),
        }
    }
}
