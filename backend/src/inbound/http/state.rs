//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the order service and the queue port and remain testable
//! without I/O.

use std::sync::Arc;

use crate::domain::OrderService;
use crate::domain::ports::OrderQueue;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub orders: OrderService,
    pub queue: Arc<dyn OrderQueue>,
    pub app_version: String,
}

impl HttpState {
    /// Bundle the order service and intake queue for handlers.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use order_service::domain::OrderService;
    /// use order_service::inbound::http::state::HttpState;
    /// use order_service::outbound::queue::InMemoryOrderQueue;
    /// use order_service::test_support::InMemoryOrderRepository;
    ///
    /// let state = HttpState::new(
    ///     OrderService::new(Arc::new(InMemoryOrderRepository::default())),
    ///     Arc::new(InMemoryOrderQueue::new()),
    ///     "1.0.0",
    /// );
    /// assert_eq!(state.app_version, "1.0.0");
    /// ```
    pub fn new(
        orders: OrderService,
        queue: Arc<dyn OrderQueue>,
        app_version: impl Into<String>,
    ) -> Self {
        Self {
            orders,
            queue,
            app_version: app_version.into(),
        }
    }
}
