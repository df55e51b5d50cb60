//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{Error, OrderId, Status};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidOrderId,
    InvalidStatus,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidOrderId => "invalid_order_id",
            ErrorCode::InvalidStatus => "invalid_status",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_order_id_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a non-negative integer"))
        .with_value(ErrorCode::InvalidOrderId, value)
}

pub(crate) fn invalid_status_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be 0, 1, or 2"))
        .with_value(ErrorCode::InvalidStatus, value)
}

pub(crate) fn parse_order_id(value: &str, field: FieldName) -> Result<OrderId, Error> {
    OrderId::parse(value).map_err(|_| invalid_order_id_error(field, value))
}

pub(crate) fn parse_status(value: i64, field: FieldName) -> Result<Status, Error> {
    Status::try_from(value).map_err(|_| invalid_status_error(field, &value.to_string()))
}

/// Parse a required status from a query-string value.
pub(crate) fn parse_status_param(value: Option<&str>, field: FieldName) -> Result<Status, Error> {
    let raw = value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| missing_field_error(field))?;
    let code = raw
        .parse::<i64>()
        .map_err(|_| invalid_status_error(field, raw))?;
    parse_status(code, field)
}
