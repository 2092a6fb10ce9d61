//! Sets of per-method handlers served under one API route.
use crate::context::RequestContext;
use crate::error::BoxError;
use crate::method::MethodKey;

use std::fmt;
use std::future::Future;

use futures_util::future::BoxFuture;
use hyper::Method;

/// Represents an API handler function.
///
/// This trait is implemented for asynchronous functions that take a
/// [`RequestContext`] and return a `Result<(), BoxError>`. The handler answers
/// the request by ending `ctx.res`.
/// ```rust
/// # use filerouter::{BoxError, Handler, RequestContext};
/// async fn hello(ctx: RequestContext) -> Result<(), BoxError> {
///     ctx.res.end("Hello, World!");
///     Ok(())
/// }
///
/// let handler: Box<dyn Handler> = Box::new(hello);
/// ```
pub trait Handler: Send + Sync {
    fn handle(&self, ctx: RequestContext) -> BoxFuture<'static, Result<(), BoxError>>;
}

impl<F, R> Handler for F
where
    F: Fn(RequestContext) -> R + Send + Sync,
    R: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    fn handle(&self, ctx: RequestContext) -> BoxFuture<'static, Result<(), BoxError>> {
        Box::pin(self(ctx))
    }
}

/// The handlers one API route answers with, keyed by method.
///
/// ```rust
/// # use filerouter::{ApiModule, BoxError, MethodKey, RequestContext};
/// async fn list(ctx: RequestContext) -> Result<(), BoxError> {
///     ctx.res.end("[]");
///     Ok(())
/// }
///
/// async fn create(ctx: RequestContext) -> Result<(), BoxError> {
///     ctx.res.end("created");
///     Ok(())
/// }
///
/// let module = ApiModule::new().get(list).post(create);
/// assert_eq!(module.allowed(), [MethodKey::Get, MethodKey::Post]);
/// ```
#[derive(Default)]
pub struct ApiModule {
    handlers: [Option<Box<dyn Handler>>; MethodKey::COUNT],
}

impl ApiModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `key`, replacing any previous handler.
    pub fn handle(mut self, key: MethodKey, handler: impl Handler + 'static) -> Self {
        self.handlers[key.index()] = Some(Box::new(handler));
        self
    }

    /// Register a handler for `GET` requests
    pub fn get(self, handler: impl Handler + 'static) -> Self {
        self.handle(MethodKey::Get, handler)
    }

    /// Register a handler for `POST` requests
    pub fn post(self, handler: impl Handler + 'static) -> Self {
        self.handle(MethodKey::Post, handler)
    }

    /// Register a handler for `PUT` requests
    pub fn put(self, handler: impl Handler + 'static) -> Self {
        self.handle(MethodKey::Put, handler)
    }

    /// Register a handler for `DELETE` requests
    pub fn delete(self, handler: impl Handler + 'static) -> Self {
        self.handle(MethodKey::Delete, handler)
    }

    /// Register a handler for `PATCH` requests
    pub fn patch(self, handler: impl Handler + 'static) -> Self {
        self.handle(MethodKey::Patch, handler)
    }

    /// Register a handler for `OPTIONS` requests
    pub fn options(self, handler: impl Handler + 'static) -> Self {
        self.handle(MethodKey::Options, handler)
    }

    /// Register a handler for `HEAD` requests
    pub fn head(self, handler: impl Handler + 'static) -> Self {
        self.handle(MethodKey::Head, handler)
    }

    /// Register a handler for any method without a handler of its own.
    pub fn all(self, handler: impl Handler + 'static) -> Self {
        self.handle(MethodKey::All, handler)
    }

    /// Selects the handler for `method`: the method's own handler, then the
    /// `All` fallback. A missing method is treated as `GET`.
    pub fn handler_for(&self, method: Option<&Method>) -> Option<&dyn Handler> {
        let key = MethodKey::from_method(method.unwrap_or(&Method::GET));

        key.and_then(|key| self.handlers[key.index()].as_deref())
            .or_else(|| self.handlers[MethodKey::All.index()].as_deref())
    }

    /// The keys this module has handlers for, in [`MethodKey::ALL_KEYS`]
    /// order.
    pub fn allowed(&self) -> Vec<MethodKey> {
        MethodKey::ALL_KEYS
            .iter()
            .copied()
            .filter(|key| self.handlers[key.index()].is_some())
            .collect()
    }
}

impl fmt::Debug for ApiModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiModule")
            .field("allowed", &self.allowed())
            .finish()
    }
}
