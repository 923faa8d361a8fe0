//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{
    Email, Error, InvalidId, Pagination, PaginationError, Password, UserValidationError, Username,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    EmptyField,
    InvalidUuid,
    InvalidPagination,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::EmptyField => "empty_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidPagination => "invalid_pagination",
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

    fn as_str(&self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(
        field,
        format!("missing required field: {}", field.as_str()),
        ErrorCode::MissingField,
    )
}

pub(crate) fn empty_field_error(field: FieldName) -> Error {
    field_error(
        field,
        format!("{} must not be empty", field.as_str()),
        ErrorCode::EmptyField,
    )
}

/// Parse a path or body identifier, reporting the offending value.
pub(crate) fn parse_id<T>(
    raw: &str,
    field: FieldName,
    parse: impl FnOnce(&str) -> Result<T, InvalidId>,
) -> Result<T, Error> {
    parse(raw).map_err(|_| {
        Error::invalid_request(format!("{} must be a valid UUID", field.as_str())).with_details(
            json!({
                "field": field.as_str(),
                "value": raw,
                "code": ErrorCode::InvalidUuid.as_str(),
            }),
        )
    })
}

pub(crate) fn parse_pagination(offset: u32, limit: u32) -> Result<Pagination, Error> {
    Pagination::new(offset, limit).map_err(|err: PaginationError| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "limit",
            "value": limit,
            "code": ErrorCode::InvalidPagination.as_str(),
        }))
    })
}

pub(crate) fn require_text(value: Option<String>, field: FieldName) -> Result<String, Error> {
    let value = value.ok_or_else(|| missing_field_error(field))?;
    if value.trim().is_empty() {
        return Err(empty_field_error(field));
    }
    Ok(value)
}

pub(crate) fn parse_username(raw: Option<String>) -> Result<Username, Error> {
    let field = FieldName::new("username");
    let raw = raw.ok_or_else(|| missing_field_error(field))?;
    Username::new(raw).map_err(|_: UserValidationError| empty_field_error(field))
}

pub(crate) fn parse_email(raw: Option<String>) -> Result<Email, Error> {
    let field = FieldName::new("email");
    let raw = raw.ok_or_else(|| missing_field_error(field))?;
    Email::new(raw).map_err(|_: UserValidationError| empty_field_error(field))
}

pub(crate) fn parse_password(raw: Option<String>) -> Result<Password, Error> {
    let field = FieldName::new("password");
    let raw = raw.ok_or_else(|| missing_field_error(field))?;
    if raw.is_empty() {
        return Err(empty_field_error(field));
    }
    Ok(Password::new(raw))
}
