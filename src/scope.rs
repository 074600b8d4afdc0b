//! Per-request execution scope.

use std::fmt;
use std::time::Instant;

use http::{Method, Version};
use tracing::Span;

use crate::logging::Logger;
use crate::request::Request;

/// Header carrying a caller-supplied request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Everything a handler needs to know about the request it runs in.
///
/// The pipeline builds exactly one scope per request, before any handler
/// runs, and attaches it to the [`Request`]. Handlers read it back with
/// [`Request::scope`]. It is immutable once built.
///
/// Every entry logged through a scope carries the request id, method and
/// path, so handlers log `scope.info(format_args!(...))` and get correlated
/// output for free.
#[derive(Debug)]
pub struct RequestScope {
    started_at: Instant,
    logger: Logger,
    span: Span,
    request_id: String,
    method: Method,
    path: String,
    version: Version,
}

impl RequestScope {
    /// `started_at` is supplied by the caller rather than read from the clock
    /// here, so elapsed-time computations are reproducible.
    pub fn new(started_at: Instant, logger: Logger, request: &Request) -> Self {
        let request_id = request
            .header(REQUEST_ID_HEADER)
            .filter(|id| !id.is_empty())
            .map_or_else(|| uuid::Uuid::new_v4().simple().to_string(), str::to_owned);
        let span = logger.request_span(&request_id, request.method(), request.path());

        Self {
            started_at,
            logger,
            span,
            request_id,
            method: request.method().clone(),
            path: request.path().to_owned(),
            version: request.version(),
        }
    }

    /// When the pipeline began handling the request.
    pub fn started_at(&self) -> Instant { self.started_at }

    /// The inbound `x-request-id`, or a generated UUID.
    pub fn request_id(&self) -> &str { &self.request_id }

    /// Request method.
    pub fn method(&self) -> &Method { &self.method }

    /// Request path, without the query string.
    pub fn path(&self) -> &str { &self.path }

    /// Protocol version the request arrived on.
    pub fn version(&self) -> Version { self.version }

    /// Logs at info level inside the request span.
    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(|| tracing::info!("{args}"));
    }

    /// Logs at warn level inside the request span.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(|| tracing::warn!("{args}"));
    }

    /// Logs at error level inside the request span.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.emit(|| tracing::error!("{args}"));
    }

    fn emit(&self, event: impl FnOnce()) {
        self.logger.in_scope(|| self.span.in_scope(event));
    }
}
