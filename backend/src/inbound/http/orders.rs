//! Order HTTP handlers.
//!
//! ```text
//! POST /order/intake     Queue a new order message
//! GET /order/fetch        Drain the intake queue, store, return pending orders
//! GET /order?status=N     List orders in a status
//! GET /order/{orderId}    Fetch one order
//! PUT /order              Replace an order's customer, items, and status
//! ```
//!
//! `/order/fetch` must be registered before `/order/{orderId}`.

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Order, OrderItem};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::repository_error;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_order_id, parse_status, parse_status_param,
};

/// One order line.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemBody {
    pub product_id: i64,
    pub quantity: i64,
    pub price: f64,
}

/// Order as exchanged over HTTP.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderBody {
    /// Decimal order identifier.
    #[schema(example = "7")]
    pub order_id: String,
    pub customer_id: String,
    #[serde(default)]
    pub items: Vec<OrderItemBody>,
    /// 0 = pending, 1 = processing, 2 = complete.
    #[schema(minimum = 0, maximum = 2)]
    pub status: i64,
}

/// Query string for listing orders.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersQuery {
    /// Status code to filter by (0, 1, or 2).
    pub status: Option<String>,
}

impl From<OrderItem> for OrderItemBody {
    fn from(item: OrderItem) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
        }
    }
}

impl From<OrderItemBody> for OrderItem {
    fn from(item: OrderItemBody) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
        }
    }
}

impl From<Order> for OrderBody {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.order_id.into(),
            customer_id: order.customer_id,
            items: order.items.into_iter().map(OrderItemBody::from).collect(),
            status: i64::from(order.status.code()),
        }
    }
}

fn into_bodies(orders: Vec<Order>) -> Vec<OrderBody> {
    orders.into_iter().map(OrderBody::from).collect()
}

fn parse_order_body(body: OrderBody) -> ApiResult<Order> {
    Ok(Order {
        order_id: parse_order_id(&body.order_id, FieldName::new("orderId"))?,
        customer_id: body.customer_id,
        items: body.items.into_iter().map(OrderItem::from).collect(),
        status: parse_status(body.status, FieldName::new("status"))?,
    })
}

/// Acknowledgement for a queued order message.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueuedBody {
    /// Identifier the order was queued under.
    #[schema(example = "7")]
    pub order_id: String,
}

/// Queue a new order message for the next `/order/fetch`.
///
/// The body is `{orderId?, customerId, items}`; a missing id is generated.
#[utoipa::path(
    post,
    path = "/order/intake",
    request_body(content = String, content_type = "application/json", description = "Order message"),
    responses(
        (status = 202, description = "Order queued", body = QueuedBody),
        (status = 400, description = "Malformed order message", body = ErrorSchema),
        (status = 500, description = "Queue failure; no body")
    ),
    tags = ["orders"],
    operation_id = "submitOrder"
)]
#[post("/order/intake")]
pub async fn submit_order(
    state: web::Data<HttpState>,
    payload: web::Bytes,
) -> ApiResult<HttpResponse> {
    let order_id = state.queue.submit(&payload).await?;
    Ok(HttpResponse::Accepted().json(QueuedBody {
        order_id: order_id.to_string(),
    }))
}

/// Ingest queued orders, then return every pending order.
///
/// Used by the makeline worker. Redelivered orders are absorbed by the
/// store's duplicate handling; a batch that fails to store goes back on the
/// queue.
#[utoipa::path(
    get,
    path = "/order/fetch",
    responses(
        (status = 200, description = "Pending orders", body = Vec<OrderBody>),
        (status = 500, description = "Queue or store failure; no body")
    ),
    tags = ["orders"],
    operation_id = "fetchOrders"
)]
#[get("/order/fetch")]
pub async fn fetch_orders(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<OrderBody>>> {
    let queued = state.queue.fetch_orders().await?;
    if let Err(err) = state.orders.insert_orders(&queued).await {
        let count = queued.len();
        match state.queue.requeue(queued).await {
            Ok(()) => warn!(count, "returned unsaved orders to the queue"),
            Err(requeue_err) => {
                error!(count, error = %requeue_err, "unsaved orders could not be requeued");
            }
        }
        return Err(repository_error("insert_orders")(err));
    }
    let pending = state
        .orders
        .get_pending_orders()
        .await
        .map_err(repository_error("get_pending_orders"))?;
    Ok(web::Json(into_bodies(pending)))
}

/// List orders whose status equals `status`.
#[utoipa::path(
    get,
    path = "/order",
    params(ListOrdersQuery),
    responses(
        (status = 200, description = "Orders in the status", body = Vec<OrderBody>),
        (status = 400, description = "Missing or invalid status", body = ErrorSchema),
        (status = 500, description = "Store failure; no body")
    ),
    tags = ["orders"],
    operation_id = "listOrders"
)]
#[get("/order")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    query: web::Query<ListOrdersQuery>,
) -> ApiResult<web::Json<Vec<OrderBody>>> {
    let status = parse_status_param(query.status.as_deref(), FieldName::new("status"))?;
    let orders = state
        .orders
        .get_orders_by_status(status)
        .await
        .map_err(repository_error("get_orders_by_status"))?;
    Ok(web::Json(into_bodies(orders)))
}

/// Fetch a single order.
#[utoipa::path(
    get,
    path = "/order/{orderId}",
    params(("orderId" = String, Path, description = "Decimal order identifier")),
    responses(
        (status = 200, description = "The order", body = OrderBody),
        (status = 400, description = "Order id is not a non-negative integer", body = ErrorSchema),
        (status = 404, description = "No such order", body = ErrorSchema),
        (status = 500, description = "Store failure; no body")
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/order/{order_id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrderBody>> {
    let order_id = parse_order_id(&path.into_inner(), FieldName::new("orderId"))?;
    let order = state
        .orders
        .get_order(&order_id)
        .await
        .map_err(repository_error("get_order"))?;
    Ok(web::Json(order.into()))
}

/// Replace an existing order.
#[utoipa::path(
    put,
    path = "/order",
    request_body = OrderBody,
    responses(
        (status = 202, description = "Order updated"),
        (status = 400, description = "Invalid order id, status, or body", body = ErrorSchema),
        (status = 404, description = "No such order", body = ErrorSchema),
        (status = 500, description = "Store failure; no body")
    ),
    tags = ["orders"],
    operation_id = "updateOrder"
)]
#[put("/order")]
pub async fn update_order(
    state: web::Data<HttpState>,
    payload: web::Json<OrderBody>,
) -> ApiResult<HttpResponse> {
    let order = parse_order_body(payload.into_inner())?;
    state
        .orders
        .update_order(&order)
        .await
        .map_err(repository_error("update_order"))?;
    Ok(HttpResponse::Accepted().finish())
}

#[cfg(test)]
#[path = "orders_tests.rs"]
mod tests;
