//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod order_queue;
mod order_repository;

#[cfg(test)]
pub use order_queue::MockOrderQueue;
pub use order_queue::{OrderQueue, OrderQueueError};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{OrderRepository, OrderRepositoryError};
