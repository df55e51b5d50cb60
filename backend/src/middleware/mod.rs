//! Request middleware.
//!
//! Purpose: request lifecycle concerns shared by every route: trace
//! identifiers with completion logging, and cross-origin access.

pub mod cors;
pub mod trace;

pub use cors::cors;
pub use trace::Trace;
