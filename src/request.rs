//! Incoming HTTP request type.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::{Extensions, HeaderMap, Method, Version};

use crate::scope::RequestScope;

/// An incoming HTTP request with its body fully read.
pub struct Request {
    pub(crate) head: http::request::Parts,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    /// Wraps an `http::Request` whose body has already been collected.
    pub fn from_http(req: http::Request<Bytes>) -> Self {
        let (head, body) = req.into_parts();
        Self { head, body, params: HashMap::new() }
    }

    /// Request method.
    pub fn method(&self) -> &Method { &self.head.method }

    /// URI path, without the query string.
    pub fn path(&self) -> &str { self.head.uri.path() }

    /// Raw query string, if the URI has one.
    pub fn query(&self) -> Option<&str> { self.head.uri.query() }

    /// Protocol version the request arrived on.
    pub fn version(&self) -> Version { self.head.version }

    /// All request headers.
    pub fn headers(&self) -> &HeaderMap { &self.head.headers }

    /// The collected request body.
    pub fn body(&self) -> &[u8] { &self.body }

    /// Header lookup; `http` header names are case-insensitive.
    /// Values that are not visible ASCII are treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Typed values attached to the request, the scope among them.
    pub fn extensions(&self) -> &Extensions { &self.head.extensions }

    /// Mutable access to the typed extensions.
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.head.extensions }

    /// The scope the pipeline attached to this request.
    ///
    /// # Panics
    ///
    /// Panics if the request did not come through
    /// [`Pipeline::handle`](crate::middleware::Pipeline::handle). That is a
    /// wiring bug, not a runtime condition.
    pub fn scope(&self) -> &RequestScope {
        self.try_scope()
            .expect("no RequestScope attached: handler invoked outside the gatehouse pipeline")
    }

    /// Like [`scope`](Request::scope), for code that may run outside the
    /// pipeline.
    pub fn try_scope(&self) -> Option<&RequestScope> {
        self.scope_handle().map(Arc::as_ref)
    }

    /// The shared handle itself, for callers that need to keep the scope
    /// alive beyond the request borrow.
    pub fn scope_handle(&self) -> Option<&Arc<RequestScope>> {
        self.head.extensions.get::<Arc<RequestScope>>()
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }
}
