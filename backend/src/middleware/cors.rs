//! Cross-origin policy for browser clients.
//!
//! The admin UI is served from its own origin, so every route accepts any
//! origin with the methods and headers a JSON client sends. Responses carry
//! no cookies or credentials.

use actix_cors::Cors;
use actix_web::http::header;

/// Seconds a browser may cache a preflight result.
pub const PREFLIGHT_MAX_AGE_SECS: usize = 12 * 60 * 60;

/// Permissive CORS layer: any origin, the common REST methods, JSON headers.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use order_service::middleware::cors;
///
/// let app = App::new().wrap(cors());
/// ```
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"])
        .allowed_headers([header::ORIGIN, header::CONTENT_LENGTH, header::CONTENT_TYPE])
        .max_age(PREFLIGHT_MAX_AGE_SECS)
}
