//! Order service façade shared by request handlers.
//!
//! The service owns the repository selected at startup and forwards each
//! call unchanged, so handlers stay independent of the concrete backend.

use std::fmt;
use std::sync::Arc;

use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::domain::{Order, OrderId, Status};

/// Backend-agnostic handle to the order store.
///
/// Cloning is cheap; every clone shares the same repository and therefore
/// the same backend client.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use order_service::domain::OrderService;
/// use order_service::test_support::InMemoryOrderRepository;
///
/// let service = OrderService::new(Arc::new(InMemoryOrderRepository::default()));
/// let _shared = service.clone();
/// ```
#[derive(Clone)]
pub struct OrderService {
    repository: Arc<dyn OrderRepository>,
}

impl OrderService {
    /// Wrap the repository chosen by the factory.
    pub fn new(repository: Arc<dyn OrderRepository>) -> Self {
        Self { repository }
    }

    /// Insert newly queued orders, skipping ones that already exist.
    pub async fn insert_orders(&self, orders: &[Order]) -> Result<(), OrderRepositoryError> {
        self.repository.insert_orders(orders).await
    }

    /// Orders waiting for the makeline.
    pub async fn get_pending_orders(&self) -> Result<Vec<Order>, OrderRepositoryError> {
        self.repository.get_pending_orders().await
    }

    /// Orders currently in `status`.
    pub async fn get_orders_by_status(
        &self,
        status: Status,
    ) -> Result<Vec<Order>, OrderRepositoryError> {
        self.repository.get_orders_by_status(status).await
    }

    /// One order by id.
    pub async fn get_order(&self, order_id: &OrderId) -> Result<Order, OrderRepositoryError> {
        self.repository.get_order(order_id).await
    }

    /// Replace the mutable fields of an existing order.
    pub async fn update_order(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        self.repository.update_order(order).await
    }
}

impl fmt::Debug for OrderService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderService").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "order_service_tests.rs"]
mod tests;
