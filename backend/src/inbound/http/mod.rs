//! HTTP inbound adapter exposing the order REST endpoints.

use actix_web::web;

pub mod error;
pub mod health;
pub mod orders;
pub mod schemas;
pub mod state;
pub mod validation;

pub use error::ApiResult;

/// Register every route and the extractor error handlers.
///
/// `state` must already be registered as `web::Data<HttpState>` on the app.
///
/// # Examples
/// ```
/// use actix_web::App;
///
/// let _app = App::new().configure(order_service::inbound::http::configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, req| error::extractor_error(err, req)))
        .app_data(web::QueryConfig::default().error_handler(|err, req| error::extractor_error(err, req)))
        .app_data(web::PathConfig::default().error_handler(|err, req| error::extractor_error(err, req)))
        .service(health::health)
        .service(orders::submit_order)
        .service(orders::fetch_orders)
        .service(orders::list_orders)
        .service(orders::get_order)
        .service(orders::update_order);
}
