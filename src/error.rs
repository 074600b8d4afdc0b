//! Unified error type.

use thiserror::Error;

/// The error type returned by gatehouse's fallible operations.
///
/// Request-level failures (404, 422, etc.) never surface here: they travel
/// as [`BoxError`](crate::BoxError) values through the handler chain and are
/// turned into [`ApiError`](crate::ApiError) responses by the pipeline. This
/// type covers startup and infrastructure failures: loading configuration,
/// building the log subscriber, binding a port.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("config: {0}")]
    Config(String),

    #[error("log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
