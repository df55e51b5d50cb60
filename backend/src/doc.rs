//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every order endpoint, the health probe, and the
//! schema wrappers that describe domain types without coupling them to
//! utoipa. The document is exported via `cargo run --bin openapi-dump`.

use utoipa::OpenApi;

use crate::inbound::http::health::HealthBody;
use crate::inbound::http::orders::{OrderBody, OrderItemBody, QueuedBody};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Order service API",
        description = "Order intake, status queries, and updates for the makeline and admin UI."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::orders::submit_order,
        crate::inbound::http::orders::fetch_orders,
        crate::inbound::http::orders::list_orders,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::orders::update_order,
        crate::inbound::http::health::health,
    ),
    components(schemas(OrderBody, OrderItemBody, QueuedBody, HealthBody, ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "orders", description = "Order lifecycle operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
