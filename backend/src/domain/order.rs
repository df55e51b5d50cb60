//! Order entity and status lifecycle.
//!
//! Purpose: define the order record every storage backend persists and the
//! finite set of statuses it moves through. Invalid identifiers and status
//! values are rejected when the types are constructed, so an `Order` held
//! by the core is always storable as-is.
//!
//! Serialisation contract (camelCase, shared by HTTP, queue messages, and
//! partitioned-store documents):
//!
//! ```json
//! {"orderId": "7", "customerId": "c1", "items": [], "status": 0}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors raised while parsing an [`OrderId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderIdError {
    /// The value is not a non-negative decimal integer.
    #[error("order id must be a non-negative integer, got {value:?}")]
    NotAnInteger { value: String },
}

/// Canonical decimal order identifier.
///
/// ## Invariants
/// - Holds the canonical decimal form of a `u64`: no sign, no leading
///   zeros, and parsing it back yields the same integer.
///
/// # Examples
/// ```
/// use order_service::domain::OrderId;
///
/// let id = OrderId::parse("007").expect("numeric id");
/// assert_eq!(id.as_str(), "7");
/// assert!(OrderId::parse("-1").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderId(String);

impl OrderId {
    /// Parse and normalise a raw identifier.
    ///
    /// Accepts anything a decimal `u64` parser accepts (`"007"`, `"+7"`) and
    /// re-derives the canonical form.
    pub fn parse(raw: &str) -> Result<Self, OrderIdError> {
        raw.parse::<u64>()
            .map(Self::from)
            .map_err(|_| OrderIdError::NotAnInteger {
                value: raw.to_owned(),
            })
    }

    /// Borrow the canonical string form.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Integer value of the identifier.
    pub fn value(&self) -> u64 {
        // The invariant guarantees the stored form parses.
        self.0.parse().unwrap_or_default()
    }
}

impl From<u64> for OrderId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl TryFrom<String> for OrderId {
    type Error = OrderIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OrderId> for String {
    fn from(value: OrderId) -> Self {
        value.0
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised while converting an integer to a [`Status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    /// The integer is not one of the known status codes.
    #[error("status must be 0 (pending), 1 (processing) or 2 (complete), got {value}")]
    OutOfRange { value: i64 },
}

/// Order lifecycle status, serialised as its integer code.
///
/// Callers are expected to move orders forward
/// (`Pending → Processing → Complete`) but no transition graph is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i32")]
pub enum Status {
    /// Queued and waiting for the makeline.
    Pending = 0,
    /// Being prepared.
    Processing = 1,
    /// Shipped.
    Complete = 2,
}

impl Status {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Processing, Self::Complete];

    /// Integer code stored by every backend.
    pub const fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i64> for Status {
    type Error = StatusError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Processing),
            2 => Ok(Self::Complete),
            _ => Err(StatusError::OutOfRange { value }),
        }
    }
}

impl TryFrom<i32> for Status {
    type Error = StatusError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(value))
    }
}

impl From<Status> for i32 {
    fn from(value: Status) -> Self {
        value.code()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Complete => "complete",
        };
        f.write_str(label)
    }
}

/// A single order line. Composition and pricing are owned elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: i64,
    pub quantity: i64,
    pub price: f64,
}

/// Customer purchase record tracked through [`Status`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub customer_id: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub status: Status,
}

impl Order {
    /// Build a freshly queued order in [`Status::Pending`].
    pub fn pending(order_id: OrderId, customer_id: impl Into<String>, items: Vec<OrderItem>) -> Self {
        Self {
            order_id,
            customer_id: customer_id.into(),
            items,
            status: Status::Pending,
        }
    }

    /// Return a copy of this order with a different status.
    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }
}
