//! HTTP server configuration object.

use std::net::SocketAddr;
use std::sync::Arc;

use order_service::domain::OrderService;
use order_service::domain::ports::OrderQueue;

/// Everything the HTTP server needs once the order store is connected.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) orders: OrderService,
    pub(crate) queue: Arc<dyn OrderQueue>,
    pub(crate) app_version: String,
}

impl ServerConfig {
    /// Construct a server configuration around a connected order service.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        orders: OrderService,
        queue: Arc<dyn OrderQueue>,
        app_version: impl Into<String>,
    ) -> Self {
        Self {
            bind_addr,
            orders,
            queue,
            app_version: app_version.into(),
        }
    }
}
