//! Domain entities, ports, and the order service façade.
//!
//! Public surface:
//! - `Order`, `OrderId`, `OrderItem`, `Status`: the order record and its
//!   lifecycle.
//! - `OrderService`: the single object request handlers depend on.
//! - `Error`, `ErrorCode`: transport-agnostic error payload.
//! - `ports`: traits implemented by outbound adapters.

pub mod error;
pub mod order;
mod order_service;
pub mod ports;

pub use self::error::{Error, ErrorCode};
pub use self::order::{Order, OrderId, OrderIdError, OrderItem, Status, StatusError};
pub use self::order_service::OrderService;
