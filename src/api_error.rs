//! The client-facing error vocabulary and the failure shapes the pipeline
//! recognises.
//!
//! [`ApiError`] is what leaves the server: a status code, a stable
//! `error_code`, a message that is safe to show a client, and optional
//! field-level `details`. The other types here are the well-known failures
//! that [`convert_error`](crate::classify::convert_error) maps onto it.

use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::response::{IntoResponse, Reply, Response};
use crate::validation::ValidationErrors;
use crate::BoxError;

const INVALID_DATA_MESSAGE: &str =
    "There is some problem with the data you submitted. See \"details\" for more information.";
const INTERNAL_MESSAGE: &str =
    "We have encountered an internal server error. Please try again later.";

/// Returned by data-access code when a lookup matched no rows.
///
/// Always classified as `404 NOT_FOUND`, wherever it was raised.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Error)]
#[error("no rows in result set")]
pub struct NoRows;

/// A routing or protocol-level failure carrying its own HTTP status.
///
/// The router raises `404` for unmatched paths; handlers may raise `401`
/// when credentials are missing or wrong. Only those two statuses have a
/// dedicated classification, everything else becomes a generic `500`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    /// An error whose message is the status' canonical reason phrase.
    pub fn from_status(status: StatusCode) -> Self {
        Self::new(status, status.canonical_reason().unwrap_or("Unknown Status"))
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn message(&self) -> &str { &self.message }
}

/// A classified, client-safe error.
///
/// Serialises as:
///
/// ```json
/// {"status_code":400,"error_code":"INVALID_DATA","message":"...","details":{"name":"cannot be blank"}}
/// ```
///
/// The wrapped internal error of an `INTERNAL_SERVER_ERROR` is kept for
/// logging only and is never serialised.
#[derive(Clone, Debug, Serialize)]
pub struct ApiError {
    #[serde(rename = "status_code", serialize_with = "status_as_u16")]
    status: StatusCode,
    error_code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<ValidationErrors>,
    #[serde(skip)]
    internal: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl ApiError {
    /// An application-specific error. Handlers may return these directly;
    /// the pipeline passes them through untouched.
    pub fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error_code: error_code.into(),
            message: message.into(),
            details: None,
            internal: None,
        }
    }

    /// `404 NOT_FOUND` — "`resource` was not found".
    pub fn not_found(resource: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", format!("{resource} was not found"))
    }

    /// `401 UNAUTHORIZED` with the given message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    /// `400 INVALID_DATA` carrying the field failures as `details`.
    pub fn invalid_data(errors: ValidationErrors) -> Self {
        Self {
            details: Some(errors),
            ..Self::new(StatusCode::BAD_REQUEST, "INVALID_DATA", INVALID_DATA_MESSAGE)
        }
    }

    /// `500 INTERNAL_SERVER_ERROR` with a fixed message. `err` is retained
    /// for logs and reachable through [`std::error::Error::source`].
    pub fn internal_server_error(err: BoxError) -> Self {
        Self {
            internal: Some(Arc::from(err)),
            ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR", INTERNAL_MESSAGE)
        }
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn error_code(&self) -> &str { &self.error_code }
    pub fn message(&self) -> &str { &self.message }
    pub fn details(&self) -> Option<&ValidationErrors> { self.details.as_ref() }
}

impl PartialEq for ApiError {
    /// Compares what the client would see; the internal error is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status
            && self.error_code == other.error_code
            && self.message == other.message
            && self.details == other.details
    }
}

impl Eq for ApiError {}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.status.as_u16(), self.error_code, self.message)
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.internal.as_deref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        Response::to_json(self.status, &self)
    }
}

impl Reply for ApiError {
    fn into_reply(self) -> Result<Response, BoxError> {
        Err(Box::new(self))
    }
}

fn status_as_u16<S: Serializer>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u16(status.as_u16())
}
