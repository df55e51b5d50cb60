//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: order repositories for the MongoDB API and the
//!   Cosmos DB SQL API, plus the startup factory choosing between them
//! - **queue**: in-process order intake queue
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod persistence;
pub mod queue;
