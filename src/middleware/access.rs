//! Access logging.
//!
//! One line per request, after the response is settled:
//!
//! ```text
//! [12.345ms] GET /artists/7 HTTP/1.1 200 42
//! ```

use std::time::{Duration, Instant};

use http::StatusCode;

use crate::response::Response;
use crate::scope::RequestScope;

/// Records the status and size of the response a request produced.
///
/// Status starts at `200 OK` and follows the committed response; the byte
/// count only grows.
#[derive(Debug)]
pub struct LogResponseWriter {
    status: StatusCode,
    bytes_written: u64,
    response: Option<Response>,
}

impl LogResponseWriter {
    pub fn new() -> Self {
        Self { status: StatusCode::OK, bytes_written: 0, response: None }
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn bytes_written(&self) -> u64 { self.bytes_written }

    /// Takes the response that will be sent. Called once per request.
    pub(crate) fn commit(&mut self, response: Response) {
        self.status = response.status_code();
        self.bytes_written += response.body().len() as u64;
        self.response = Some(response);
    }

    pub(crate) fn into_response(self) -> Response {
        self.response.unwrap_or_else(|| Response::status(self.status))
    }
}

impl Default for LogResponseWriter {
    fn default() -> Self { Self::new() }
}

/// Fractional milliseconds between `start` and `now`, never negative.
pub(crate) fn elapsed_ms(start: Instant, now: Instant) -> f64 {
    duration_ms(now.saturating_duration_since(start))
}

fn duration_ms(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1e6
}

pub(crate) fn access_line(scope: &RequestScope, writer: &LogResponseWriter, now: Instant) -> String {
    format!(
        "[{:.3}ms] {} {} {:?} {} {}",
        elapsed_ms(scope.started_at(), now),
        scope.method(),
        scope.path(),
        scope.version(),
        writer.status().as_u16(),
        writer.bytes_written(),
    )
}

/// Writes the access line for a finished request through its scope.
pub(crate) fn log_access(scope: &RequestScope, writer: &LogResponseWriter, now: Instant) {
    scope.info(format_args!("{}", access_line(scope, writer, now)));
}
