//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent responses. Client errors
//! carry a JSON payload; internal errors carry no body.

use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::ports::{OrderQueueError, OrderRepositoryError};
use crate::domain::{Error, ErrorCode};
use crate::middleware::trace::TRACE_ID_HEADER;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        match self.code() {
            ErrorCode::InternalError => builder.finish(),
            _ => builder.json(self),
        }
    }
}

/// Map a repository failure, logging anything other than a missing order.
pub(crate) fn repository_error(operation: &'static str) -> impl FnOnce(OrderRepositoryError) -> Error {
    move |err| match err {
        OrderRepositoryError::NotFound { .. } => Error::not_found(err.to_string()),
        other => {
            error!(operation, error = %other, "order repository call failed");
            Error::internal("order store unavailable")
        }
    }
}

impl From<OrderQueueError> for Error {
    fn from(err: OrderQueueError) -> Self {
        match err {
            OrderQueueError::Malformed { message } => {
                Error::invalid_request(format!("order message is malformed: {message}"))
            }
            other => {
                error!(error = %other, "order queue call failed");
                Error::internal("order queue unavailable")
            }
        }
    }
}

/// Turn extractor failures (bad JSON, bad query strings) into JSON 400s.
pub(crate) fn extractor_error(
    err: impl std::fmt::Display,
    _req: &HttpRequest,
) -> actix_web::Error {
    Error::invalid_request(err.to_string()).into()
}
