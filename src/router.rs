//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. A path that matches no
//! route is not answered here: it becomes an `HttpError(404)` that the
//! pipeline classifies like any other failure.

use std::collections::HashMap;
use std::future::ready;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::api_error::HttpError;
use crate::handler::{BoxFuture, BoxedHandler, Handler, HandlerResult};
use crate::request::Request;
use crate::BoxError;

/// The application router.
///
/// Build it once at startup and hand it to
/// [`Init::wrap`](crate::middleware::Init::wrap). Each [`Router::on`] call
/// returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them:
    ///
    /// ```rust
    /// # use gatehouse::{Request, Response, Router};
    /// # use http::Method;
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/users/{id}", get_user)
    ///     .on(Method::POST, "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics on a malformed or conflicting path. Routes are registered at
    /// startup, so this surfaces before the server accepts traffic.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// Runs the handler registered for `req`, or fails with `404`.
    pub(crate) fn dispatch(&self, mut req: Request) -> BoxFuture {
        match self.lookup(req.method(), req.path()) {
            Some((handler, params)) => {
                req.set_params(params);
                handler.call(req)
            }
            None => {
                let err: BoxError = Box::new(HttpError::from_status(StatusCode::NOT_FOUND));
                Box::pin(ready::<HandlerResult>(Err(err)))
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
