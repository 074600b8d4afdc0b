//! Handler trait and type erasure.
//!
//! The router holds handlers of different concrete types in one table, so
//! each is boxed behind [`ErasedHandler`]. The chain from user code to the
//! pipeline is:
//!
//! ```text
//! async fn get_user(req: Request) -> Result<Response, NoRows> { … }
//!        ↓ router.on(Method::GET, "/users/{id}", get_user)
//! Arc::new(FnHandler(get_user))                 ← BoxedHandler
//!        ↓ handler.call(req) at request time
//! Box::pin(async { get_user(req).await.into_reply() })
//!        ↓
//! Result<Response, BoxError>                    ← classified by recovery
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{Reply, Response};
use crate::BoxError;

/// What every handler resolves to once its return value is normalised.
pub type HandlerResult = Result<Response, BoxError>;

/// A heap-allocated, type-erased future that resolves to a [`HandlerResult`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// Satisfied automatically by any function with the shape
///
/// ```text
/// async fn name(req: Request) -> impl Reply
/// ```
///
/// Sealed: only the blanket impl below can provide it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Reply + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Reply + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: Reply + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_reply() })
    }
}
