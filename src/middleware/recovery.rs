//! The single point where failures become responses.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use thiserror::Error;

use crate::classify::convert_error;
use crate::handler::HandlerResult;
use crate::response::{IntoResponse, Response};
use crate::scope::RequestScope;
use crate::BoxError;

/// A handler panicked. Carries the panic message for the logs.
#[derive(Debug, Error)]
#[error("panic: {message}")]
pub struct Panicked {
    message: String,
}

impl Panicked {
    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(s) => *s,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(s) => (*s).to_owned(),
                Err(_) => "non-string panic payload".to_owned(),
            },
        };
        Self { message }
    }

    pub fn message(&self) -> &str { &self.message }
}

enum State {
    Running(Response),
    Recovered(BoxError),
}

/// Drives `chain` to completion and always yields exactly one response.
///
/// Either the handler's own response, or one classified error response built
/// from a returned error or a caught panic. The raw failure is logged at
/// error level before classification.
pub(crate) async fn recover<F>(scope: &RequestScope, chain: F) -> Response
where
    F: Future<Output = HandlerResult>,
{
    let state = match AssertUnwindSafe(chain).catch_unwind().await {
        Ok(Ok(response)) => State::Running(response),
        Ok(Err(err)) => State::Recovered(err),
        Err(payload) => State::Recovered(Box::new(Panicked::from_payload(payload))),
    };

    match state {
        State::Running(response) => response,
        State::Recovered(err) => {
            scope.error(format_args!("{err}"));
            convert_error(scope, err).into_response()
        }
    }
}
