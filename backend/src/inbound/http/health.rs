//! Health endpoint for orchestration probes.

use actix_web::{HttpResponse, get, http::header, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::inbound::http::state::HttpState;

/// Health probe payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthBody {
    /// Always `ok` while the process serves traffic.
    #[schema(example = "ok")]
    pub status: String,
    /// Deployed build, from `APP_VERSION`.
    #[schema(example = "1.4.2")]
    pub version: String,
}

/// Report that the service is up, with its deployed version.
#[utoipa::path(
    get,
    path = "/health",
    tags = ["health"],
    responses(
        (status = 200, description = "Service is up", body = HealthBody)
    )
)]
#[get("/health")]
pub async fn health(state: web::Data<HttpState>) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(HealthBody {
            status: "ok".to_owned(),
            version: state.app_version.clone(),
        })
}
