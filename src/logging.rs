//! The logging sink and process subscriber setup.
//!
//! gatehouse never logs per-request events through the process-wide default
//! subscriber. The host builds one [`Logger`] at startup and hands it to
//! [`middleware::init`](crate::middleware::init); every request scope writes
//! through that handle. Tests build their own `Logger` over a capturing
//! subscriber and observe exactly the lines one pipeline produced.

use serde::Deserialize;
use tracing::{Dispatch, Span};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::Error;

/// A cloneable, thread-safe handle to a `tracing` subscriber.
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// Captures whatever subscriber is the default at the call site.
    pub fn from_default() -> Self {
        Self::new(tracing::dispatcher::get_default(Dispatch::clone))
    }

    /// Runs `f` with this logger's subscriber as the default, so any
    /// `tracing` macro inside it reaches this sink.
    pub(crate) fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    pub(crate) fn request_span(&self, request_id: &str, method: &http::Method, path: &str) -> Span {
        self.in_scope(|| tracing::info_span!("request", request_id = %request_id, %method, path = %path))
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

/// Output encoding of the process subscriber.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(Error::config(format!("unknown log format `{other}`"))),
        }
    }
}

/// Builds the process subscriber.
///
/// `RUST_LOG`, when set and valid, wins over `level`.
pub fn dispatch(level: &str, format: LogFormat) -> Result<Dispatch, Error> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };

    let fmt_layer = match format {
        LogFormat::Text => tracing_subscriber::fmt::layer().boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(fmt_layer).with(filter);
    Ok(Dispatch::new(subscriber))
}

#[cfg(test)]
pub(crate) mod capture {
    //! In-memory subscriber for asserting on log output.

    use std::io;
    use std::sync::{Arc, Mutex};

    use super::Logger;

    #[derive(Clone, Default)]
    pub(crate) struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        pub(crate) fn lines(&self) -> Vec<String> {
            let buf = self.0.lock().unwrap();
            String::from_utf8_lossy(&buf).lines().map(str::to_owned).collect()
        }
    }

    impl io::Write for Capture {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    pub(crate) fn logger() -> (Logger, Capture) {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::TRACE)
            .finish();
        (Logger::new(tracing::Dispatch::new(subscriber)), capture)
    }
}
