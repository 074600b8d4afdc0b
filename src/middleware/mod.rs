//! The request-lifecycle middleware.
//!
//! Every request goes through the same steps, in this order:
//!
//! 1. a [`LogResponseWriter`] is created to capture status and size,
//! 2. a [`RequestScope`] is built and attached to the request,
//! 3. the router runs under [`recovery`], which turns any failure into
//!    exactly one classified response,
//! 4. the access line is logged,
//! 5. the response goes back to the server with the request id echoed.
//!
//! Nothing past step 1 can fail: the pipeline always yields a response.
//!
//! ```rust,no_run
//! use gatehouse::{Logger, Router, Server, middleware};
//!
//! # async fn run(router: Router) -> Result<(), gatehouse::Error> {
//! let app = middleware::init(Logger::from_default()).wrap(router);
//! Server::bind("0.0.0.0:8080".parse().unwrap()).serve(app).await
//! # }
//! ```

mod access;
mod recovery;

use std::future::{Future, ready};
use std::sync::Arc;
use std::time::Instant;

use crate::BoxError;
use crate::handler::HandlerResult;
use crate::logging::Logger;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::scope::{REQUEST_ID_HEADER, RequestScope};

pub use access::LogResponseWriter;
pub use recovery::Panicked;

/// Returns the lifecycle middleware writing through `logger`.
pub fn init(logger: Logger) -> Init {
    Init { logger }
}

/// The lifecycle middleware, not yet attached to a router.
#[derive(Clone, Debug)]
pub struct Init {
    logger: Logger,
}

impl Init {
    /// Puts `router` inside the lifecycle.
    pub fn wrap(self, router: Router) -> Pipeline {
        Pipeline { logger: self.logger, router }
    }
}

/// A router running inside the request lifecycle. Shared by every
/// connection task; holds no per-request state.
pub struct Pipeline {
    logger: Logger,
    router: Router,
}

impl Pipeline {
    /// Handles one request from start to finish.
    pub async fn handle(&self, req: Request) -> Response {
        self.run(req, |req| self.router.dispatch(req)).await
    }

    /// Answers a request that cannot reach the router, such as one whose
    /// body failed to arrive. It still gets a scope, a classified response
    /// and an access line.
    pub async fn reject(&self, req: Request, err: BoxError) -> Response {
        self.run(req, |_| ready::<HandlerResult>(Err(err))).await
    }

    async fn run<C, F>(&self, mut req: Request, chain: C) -> Response
    where
        C: FnOnce(Request) -> F,
        F: Future<Output = HandlerResult>,
    {
        let mut writer = LogResponseWriter::new();

        let scope = Arc::new(RequestScope::new(Instant::now(), self.logger.clone(), &req));
        req.extensions_mut().insert(Arc::clone(&scope));

        // The chain is built inside the guarded future: a handler may panic
        // before it hands back its own future.
        let response = recovery::recover(&scope, async move { chain(req).await }).await;
        writer.commit(response);

        access::log_access(&scope, &writer, Instant::now());

        let mut response = writer.into_response();
        if response.header(REQUEST_ID_HEADER).is_none() {
            response.push_header(REQUEST_ID_HEADER, scope.request_id());
        }
        response
    }
}
