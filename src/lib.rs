//! # gatehouse
//!
//! The request lifecycle of an HTTP API server. Nothing more.
//!
//! Every request gets a [`RequestScope`] (start time, request id, a logger
//! tagged with both), runs its handler under a single recovery point, and
//! leaves one access-log line behind. Handlers never format error
//! responses: they return whatever error is natural and
//! [`convert_error`] decides what the client sees.
//!
//! | Handler fails with | Client gets |
//! |---|---|
//! | [`NoRows`] | `404 NOT_FOUND` |
//! | [`ApiError`] | that error, unchanged |
//! | [`ValidationErrors`] | `400 INVALID_DATA` with field details |
//! | [`HttpError`] 401 / 404 | `401 UNAUTHORIZED` / `404 NOT_FOUND` |
//! | anything else, or a panic | `500 INTERNAL_SERVER_ERROR`, generic message |
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use gatehouse::{ApiError, Logger, NoRows, Request, Response, Router, Server, middleware};
//! use http::{Method, StatusCode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gatehouse::Error> {
//!     let router = Router::new()
//!         .on(Method::GET,    "/artists/{id}", get_artist)
//!         .on(Method::DELETE, "/artists/{id}", delete_artist);
//!
//!     let app = middleware::init(Logger::from_default()).wrap(router);
//!     Server::bind("0.0.0.0:8080".parse().unwrap()).serve(app).await
//! }
//!
//! async fn get_artist(req: Request) -> Result<Response, NoRows> {
//!     req.scope().info(format_args!("looking up artist {:?}", req.param("id")));
//!     Err(NoRows)
//! }
//!
//! async fn delete_artist(_req: Request) -> Result<StatusCode, ApiError> {
//!     Err(ApiError::new(StatusCode::CONFLICT, "ARTIST_IN_USE", "artist still has albums"))
//! }
//! ```

mod api_error;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod scope;
mod server;
mod validation;

pub mod classify;
pub mod cli;
pub mod config;
pub mod health;
pub mod logging;
pub mod middleware;

/// The error type handlers fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub use api_error::{ApiError, HttpError, NoRows};
pub use classify::convert_error;
pub use config::Config;
pub use error::Error;
pub use handler::{Handler, HandlerResult};
pub use logging::Logger;
pub use request::Request;
pub use response::{IntoResponse, Reply, Response, ResponseBuilder};
pub use router::Router;
pub use scope::{REQUEST_ID_HEADER, RequestScope};
pub use server::Server;
pub use validation::ValidationErrors;
