//! Outgoing HTTP response type and the handler return-value traits.
//!
//! Build a [`Response`] in your handler and return it, or return anything
//! that implements [`Reply`]: a string, a bare [`StatusCode`], an
//! [`ApiError`](crate::ApiError), or a `Result` of any of those.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use serde::Serialize;
use tracing::warn;

use crate::BoxError;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK, no custom headers needed)
///
/// ```rust
/// use gatehouse::Response;
/// use http::StatusCode;
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// Response::status(StatusCode::NO_CONTENT);
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use gatehouse::Response;
/// use http::StatusCode;
///
/// Response::builder()
///     .status(StatusCode::CREATED)
///     .header("location", "/users/42")
///     .json(br#"{"id":42}"#.to_vec());
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) status: StatusCode,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
}

impl Response {
    /// `200 OK` — `application/json`.
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::builder().json(body)
    }

    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: StatusCode) -> Self {
        Self { status: code, headers: Vec::new(), body: Bytes::new() }
    }

    /// Serialises `value` as the JSON body of a response with `code`.
    ///
    /// A value that fails to serialise yields a bodiless `500`.
    pub fn to_json<T: Serialize + ?Sized>(code: StatusCode, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => Self::builder().status(code).json(bytes),
            Err(e) => {
                warn!("response serialisation failed: {e}");
                Self::status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: StatusCode::OK }
    }

    /// Response status.
    pub fn status_code(&self) -> StatusCode { self.status }

    /// Headers in the order they will be written.
    pub fn headers(&self) -> &[(String, String)] { &self.headers }

    /// Response body bytes.
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn push_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_owned(), value.to_owned()));
    }

    /// Converts into the `http` representation hyper writes to the wire.
    ///
    /// Headers whose name or value is not valid HTTP are dropped with a
    /// warning rather than failing the whole response.
    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut builder = http::Response::builder().status(self.status);
        if let Some(headers) = builder.headers_mut() {
            for (name, value) in &self.headers {
                match (
                    http::HeaderName::from_bytes(name.as_bytes()),
                    http::HeaderValue::from_str(value),
                ) {
                    (Ok(n), Ok(v)) => { headers.append(n, v); }
                    _ => warn!(header = %name, "dropping invalid response header"),
                }
            }
        }
        let status = self.status;
        builder.body(Full::new(self.body)).unwrap_or_else(|e| {
            warn!(%status, "response build failed: {e}");
            let mut fallback = http::Response::new(Full::new(Bytes::new()));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`.
/// Terminated by a typed body method — you always know what you're sending.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: impl Into<Bytes>) -> Response {
        self.finish(JSON, body.into())
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        let body: String = body.into();
        self.finish(TEXT, Bytes::from(body))
    }

    /// Terminate with an arbitrary content type.
    pub fn bytes(self, content_type: &str, body: impl Into<Bytes>) -> Response {
        self.finish(content_type, body.into())
    }

    /// Terminate with no body (e.g. `204 No Content`, redirects).
    pub fn no_body(self) -> Response {
        Response { status: self.status, headers: self.headers, body: Bytes::new() }
    }

    fn finish(self, content_type: &str, body: Bytes) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.to_owned())];
        headers.extend(self.headers);
        Response { status: self.status, headers, body }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Infallible conversion into an HTTP [`Response`].
///
/// Implement on your own types to render them; wrap them in `Ok(..)` or
/// implement [`Reply`] to return them from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a status directly: `return StatusCode::NO_CONTENT`
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response { Response::status(self) }
}

// ── Reply ─────────────────────────────────────────────────────────────────────

/// What a handler produces: a response, or a failure for the pipeline to
/// classify.
///
/// Handlers never format their own error responses. They return `Err(e)` for
/// any `e` convertible into [`BoxError`] and the recovery step decides what
/// the client sees.
///
/// ```rust
/// use gatehouse::{NoRows, Request, Response};
///
/// async fn get_user(req: Request) -> Result<Response, NoRows> {
///     match req.param("id") {
///         Some("1") => Ok(Response::json(br#"{"id":1}"#.to_vec())),
///         _ => Err(NoRows),
///     }
/// }
/// ```
pub trait Reply {
    fn into_reply(self) -> Result<Response, BoxError>;
}

impl Reply for Response {
    fn into_reply(self) -> Result<Response, BoxError> { Ok(self) }
}

impl Reply for &'static str {
    fn into_reply(self) -> Result<Response, BoxError> { Ok(self.into_response()) }
}

impl Reply for String {
    fn into_reply(self) -> Result<Response, BoxError> { Ok(self.into_response()) }
}

impl Reply for StatusCode {
    fn into_reply(self) -> Result<Response, BoxError> { Ok(self.into_response()) }
}

impl<T, E> Reply for Result<T, E>
where
    T: Reply,
    E: Into<BoxError>,
{
    fn into_reply(self) -> Result<Response, BoxError> {
        self.map_err(Into::into).and_then(Reply::into_reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_puts_content_type_first() {
        let res = Response::builder()
            .status(StatusCode::CREATED)
            .header("location", "/users/42")
            .json(b"{}".to_vec());
        assert_eq!(res.status_code(), StatusCode::CREATED);
        assert_eq!(res.headers()[0], ("content-type".to_owned(), JSON.to_owned()));
        assert_eq!(res.header("Location"), Some("/users/42"));
    }

    #[test]
    fn err_reply_carries_the_error() {
        let reply: Result<Response, std::io::Error> =
            Err(std::io::Error::other("disk on fire"));
        let err = reply.into_reply().unwrap_err();
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn into_http_drops_invalid_headers() {
        let res = Response::builder()
            .header("bad header", "x")
            .header("x-ok", "yes")
            .text("hi")
            .into_http();
        assert_eq!(res.headers().get("x-ok").unwrap(), "yes");
        assert_eq!(res.headers().len(), 2);
    }
}
