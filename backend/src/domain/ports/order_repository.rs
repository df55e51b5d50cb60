//! Port for order persistence, implemented once per storage backend.

use async_trait::async_trait;

use crate::domain::{Order, OrderId, Status};

use super::define_port_error;

define_port_error! {
    /// Errors raised by order repository adapters.
    pub enum OrderRepositoryError {
        /// The store could not be reached or rejected our credentials.
        Connection { message: String } =>
            "order repository connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } =>
            "order repository query failed: {message}",
        /// No order with the given identifier exists.
        NotFound { order_id: String } =>
            "order {order_id} not found",
    }
}

impl OrderRepositoryError {
    /// True when the error reports a missing order rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Uniform persistence contract over every order backend.
///
/// Implementations must be safe for concurrent use: one instance is shared
/// by every in-flight request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert newly queued orders.
    ///
    /// Orders whose identifier already exists are skipped; a duplicate never
    /// fails the batch. An empty slice is a no-op.
    async fn insert_orders(&self, orders: &[Order]) -> Result<(), OrderRepositoryError>;

    /// Return every order in [`Status::Pending`].
    async fn get_pending_orders(&self) -> Result<Vec<Order>, OrderRepositoryError> {
        self.get_orders_by_status(Status::Pending).await
    }

    /// Return every order whose stored status equals `status`.
    async fn get_orders_by_status(
        &self,
        status: Status,
    ) -> Result<Vec<Order>, OrderRepositoryError>;

    /// Fetch one order, or [`OrderRepositoryError::NotFound`].
    async fn get_order(&self, order_id: &OrderId) -> Result<Order, OrderRepositoryError>;

    /// Replace the status, items, and customer of an existing order.
    ///
    /// Returns [`OrderRepositoryError::NotFound`] when no order has the id.
    async fn update_order(&self, order: &Order) -> Result<(), OrderRepositoryError>;
}
