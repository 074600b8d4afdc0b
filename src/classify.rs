//! Failure classification.
//!
//! Handlers fail with whatever error is natural where they fail. This module
//! is the one place that decides what the client sees. Recognised shapes get
//! precise semantics; everything else degrades to a generic `500` whose body
//! reveals nothing about the cause.

use http::StatusCode;

use crate::api_error::{ApiError, HttpError, NoRows};
use crate::scope::RequestScope;
use crate::validation::ValidationErrors;
use crate::BoxError;

const RESOURCE: &str = "the requested resource";

/// Maps an arbitrary failure onto the client-facing error vocabulary.
///
/// First match wins:
///
/// 1. [`NoRows`] → `404 NOT_FOUND`
/// 2. [`ApiError`] → unchanged
/// 3. [`ValidationErrors`] → `400 INVALID_DATA`, details preserved
/// 4. [`HttpError`] with 401 → `401 UNAUTHORIZED`; with 404 → `404 NOT_FOUND`
/// 5. anything else → `500 INTERNAL_SERVER_ERROR`
///
/// Never fails. `scope` is used only to note HTTP errors whose status has no
/// mapping of its own.
pub fn convert_error(scope: &RequestScope, err: BoxError) -> ApiError {
    if err.is::<NoRows>() {
        return ApiError::not_found(RESOURCE);
    }

    let err = match err.downcast::<ApiError>() {
        Ok(api) => return *api,
        Err(err) => err,
    };

    let err = match err.downcast::<ValidationErrors>() {
        Ok(errors) => return ApiError::invalid_data(*errors),
        Err(err) => err,
    };

    if let Some(http) = err.downcast_ref::<HttpError>() {
        match http.status() {
            StatusCode::UNAUTHORIZED => return ApiError::unauthorized(http.message()),
            StatusCode::NOT_FOUND => return ApiError::not_found(RESOURCE),
            // TODO: map 405 and 4xx statuses onto their own error codes
            // instead of reporting them as internal errors.
            other => scope.warn(format_args!("http error {other} has no mapping, reporting as 500")),
        }
    }

    ApiError::internal_server_error(err)
}
