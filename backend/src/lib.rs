//! Order service library modules.
//!
//! - `domain`: order entities, ports, and the `OrderService` façade
//! - `outbound`: store adapters and the backend-selection factory
//! - `inbound`: actix-web handlers
//! - `middleware`: request tracing
//! - `settings`: command-line and environment configuration

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
