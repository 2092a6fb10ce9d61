//! [`Router`](crate::Router) dispatches requests to page and API routes.
//!
//! Routes live in two tables, each sorted once by specificity when the
//! router is built. At request time the page table is scanned first and the
//! API table second; the first pattern that accepts the path wins, so a page
//! route always shadows an API route for the same path.
//!
//! ```rust,no_run
//! use filerouter::{ApiModule, BoxError, RequestContext, Router};
//!
//! async fn hello(ctx: RequestContext) -> Result<(), BoxError> {
//!     let user = ctx.params.get("user").unwrap_or("world").to_owned();
//!     ctx.res.end(format!("Hello, {}", user));
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = Router::builder()
//!         .api_module("/hello/$user", ApiModule::new().get(hello))
//!         .build()?;
//!
//!     hyper::Server::bind(&([127, 0, 0, 1], 3000).into())
//!         .serve(router.into_service())
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! Requests the router cannot hand to a handler are answered directly:
//! ```ignore
//!  no route accepts the path                 404 Not found
//!  API route without a handler for method    405 Method not allowed
//!  provider or handler error or panic        500 Internal server error
//!  handler returned without ending response  500 Internal server error
//! ```
use crate::config::Config;
use crate::context::{RequestContext, ResponseWriter};
use crate::discovery::pattern_for;
use crate::error::{BoxError, DispatchError, Error};
use crate::module::ApiModule;
use crate::path::strip_query;
use crate::pattern::Params;
use crate::provider::Provider;
use crate::table::{Entry, RouteTable};

use std::any::Any;
use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::future::{self, BoxFuture, FutureExt};
use hyper::header::{self, HeaderValue};
use hyper::service::Service;
use hyper::{Body, Request, Response};
use tracing::{debug, error};

/// Renders resolved page routes into HTML documents.
///
/// The router prepends `<!DOCTYPE html>` to the rendered document and sends
/// it with `Content-Type: text/html; charset=utf-8`.
pub trait PageRenderer: Send + Sync + 'static {
    /// What a page provider resolves to.
    type Page: Send + 'static;

    fn render(&self, page: Self::Page, params: &Params) -> Result<String, BoxError>;
}

/// The renderer of a router that only serves API routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPages;

impl PageRenderer for NoPages {
    type Page = Infallible;

    fn render(&self, page: Infallible, _: &Params) -> Result<String, BoxError> {
        match page {}
    }
}

/// Which table a route was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Page,
    Api,
}

/// The result of [`Router::lookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub kind: RouteKind,
    /// The pattern of the matched route.
    pub pattern: &'a str,
    pub params: Params,
}

/// Router dispatches requests to the most specific matching route.
pub struct Router<R: PageRenderer = NoPages> {
    renderer: R,
    pages: RouteTable<R::Page>,
    api: RouteTable<Arc<ApiModule>>,
}

impl Router {
    /// Starts building a router that serves API routes only.
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }
}

impl<R: PageRenderer> Router<R> {
    /// Resolves `path` to a route without invoking anything. Any query string
    /// or fragment is ignored.
    /// ```rust
    /// use filerouter::{ApiModule, RouteKind, Router};
    ///
    /// let router = Router::builder()
    ///     .api_module("/posts/$id", ApiModule::new())
    ///     .build()
    ///     .unwrap();
    ///
    /// let found = router.lookup("/posts/42?draft=1").unwrap();
    /// assert_eq!(found.kind, RouteKind::Api);
    /// assert_eq!(found.pattern, "/posts/$id");
    /// assert_eq!(found.params.get("id"), Some("42"));
    /// ```
    pub fn lookup(&self, path: &str) -> Option<RouteMatch<'_>> {
        let path = strip_query(path);

        if let Some((entry, params)) = self.pages.find(path) {
            return Some(RouteMatch {
                kind: RouteKind::Page,
                pattern: entry.pattern.as_str(),
                params,
            });
        }

        self.api.find(path).map(|(entry, params)| RouteMatch {
            kind: RouteKind::Api,
            pattern: entry.pattern.as_str(),
            params,
        })
    }

    /// The page table, in match order.
    pub fn pages(&self) -> &RouteTable<R::Page> {
        &self.pages
    }

    /// The API table, in match order.
    pub fn api(&self) -> &RouteTable<Arc<ApiModule>> {
        &self.api
    }

    /// Answers one request. Never fails: every error is converted into a
    /// terminal response and logged.
    pub async fn serve(&self, req: Request<Body>) -> hyper::Result<Response<Body>> {
        let method = req.method().clone();
        let target = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let path = strip_query(target).to_owned();

        let response = match self.dispatch(req, &path).await {
            Ok(response) => response,
            Err(err) => {
                match err {
                    DispatchError::RouteNotFound | DispatchError::MethodNotSupported { .. } => {
                        debug!(%method, %path, error = %err, "request not routed")
                    }
                    _ => error!(%method, %path, error = %err, "request failed"),
                }
                error_response(&err)
            }
        };

        Ok(response)
    }

    async fn dispatch(&self, req: Request<Body>, path: &str) -> Result<Response<Body>, DispatchError> {
        if let Some((entry, params)) = self.pages.find(path) {
            debug!(pattern = entry.pattern.as_str(), "matched page route");
            return self.render_page(entry, params).await;
        }

        if let Some((entry, params)) = self.api.find(path) {
            debug!(pattern = entry.pattern.as_str(), "matched api route");
            return call_api(entry, params, req).await;
        }

        Err(DispatchError::RouteNotFound)
    }

    async fn render_page(
        &self,
        entry: &Entry<R::Page>,
        params: Params,
    ) -> Result<Response<Body>, DispatchError> {
        let html = guarded(async {
            let page = entry.provider.resolve().await?;
            self.renderer.render(page, &params)
        })
        .await?;

        let mut response = Response::new(Body::from(format!("<!DOCTYPE html>{}", html)));
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        Ok(response)
    }
}

async fn call_api(
    entry: &Entry<Arc<ApiModule>>,
    params: Params,
    req: Request<Body>,
) -> Result<Response<Body>, DispatchError> {
    let module = guarded(async { entry.provider.resolve().await }).await?;

    let handler = match module.handler_for(Some(req.method())) {
        Some(handler) => handler,
        None => {
            return Err(DispatchError::MethodNotSupported {
                method: req.method().clone(),
                allowed: module.allowed(),
            })
        }
    };

    let (res, mut rx) = ResponseWriter::channel();
    let ctx = RequestContext { req, res, params };
    let outcome = guarded(async move { handler.handle(ctx).await }).await;

    match (outcome, rx.try_recv()) {
        (Ok(()), Ok(response)) => Ok(response),
        (Err(err), Ok(response)) => {
            // the response is already committed
            error!(error = %err, "handler failed after ending the response");
            Ok(response)
        }
        (Err(err), Err(_)) => Err(err),
        (Ok(()), Err(_)) => Err(DispatchError::UnterminatedResponse),
    }
}

// Runs a provider or handler future, turning errors and panics into
// dispatch errors.
async fn guarded<T, F>(fut: F) -> Result<T, DispatchError>
where
    F: Future<Output = Result<T, BoxError>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(DispatchError::HandlerFailure(err)),
        Err(panic) => Err(DispatchError::HandlerPanicked(panic_message(&*panic))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

fn error_response(err: &DispatchError) -> Response<Body> {
    let mut response = Response::new(Body::from(err.body()));
    *response.status_mut() = err.status();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );

    if let DispatchError::MethodNotSupported { allowed, .. } = err {
        let allow = allowed
            .iter()
            .filter_map(|key| key.as_method())
            .map(|method| method.as_str().to_owned())
            .collect::<Vec<_>>()
            .join(", ");

        if let Ok(allow) = HeaderValue::from_str(&allow) {
            response.headers_mut().insert(header::ALLOW, allow);
        }
    }

    response
}

impl<R: PageRenderer + fmt::Debug> fmt::Debug for Router<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("renderer", &self.renderer)
            .field("pages", &self.pages)
            .field("api", &self.api)
            .finish()
    }
}

type Routes<T> = Vec<(String, Box<dyn Provider<T>>)>;

/// Collects routes and builds a [`Router`].
///
/// Patterns are compiled and sorted by [`build`](RouterBuilder::build), which
/// fails on the first malformed pattern or unrecognized module key.
pub struct RouterBuilder<R: PageRenderer = NoPages> {
    renderer: R,
    pages: Routes<R::Page>,
    api: Routes<Arc<ApiModule>>,
    error: Option<Error>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        RouterBuilder::with_renderer(NoPages)
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: PageRenderer> RouterBuilder<R> {
    /// Starts building a router that serves page routes through `renderer`.
    pub fn with_renderer(renderer: R) -> Self {
        Self {
            renderer,
            pages: Vec::new(),
            api: Vec::new(),
            error: None,
        }
    }

    /// Adds an API route whose module is resolved by `provider` on every
    /// matching request.
    pub fn api(
        mut self,
        pattern: impl Into<String>,
        provider: impl Provider<Arc<ApiModule>> + 'static,
    ) -> Self {
        self.api.push((pattern.into(), Box::new(provider)));
        self
    }

    /// Adds an API route served by a module that is always available.
    pub fn api_module(self, pattern: impl Into<String>, module: ApiModule) -> Self {
        let module = Arc::new(module);
        self.api(pattern, move || {
            let module = module.clone();
            async move { Ok::<_, BoxError>(module) }
        })
    }

    /// Adds a page route whose page is resolved by `provider` on every
    /// matching request.
    pub fn page(
        mut self,
        pattern: impl Into<String>,
        provider: impl Provider<R::Page> + 'static,
    ) -> Self {
        self.pages.push((pattern.into(), Box::new(provider)));
        self
    }

    /// Adds API routes keyed by discovered module path, e.g.
    /// `./routes/users/$id.api.rs`. Keys are normalized with
    /// [`pattern_for`](crate::discovery::pattern_for) using the configured
    /// routes directory and API suffix.
    pub fn api_modules<I, K, P>(mut self, config: &Config, modules: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: AsRef<str>,
        P: Provider<Arc<ApiModule>> + 'static,
    {
        for (key, provider) in modules {
            match pattern_for(key.as_ref(), &config.routes_dir, &config.api_suffix) {
                Ok(pattern) => self = self.api(pattern, provider),
                Err(err) => self.error = self.error.or(Some(err)),
            }
        }
        self
    }

    /// Adds page routes keyed by discovered module path, e.g.
    /// `./routes/index.page.rs`.
    pub fn page_modules<I, K, P>(mut self, config: &Config, modules: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: AsRef<str>,
        P: Provider<R::Page> + 'static,
    {
        for (key, provider) in modules {
            match pattern_for(key.as_ref(), &config.routes_dir, &config.page_suffix) {
                Ok(pattern) => self = self.page(pattern, provider),
                Err(err) => self.error = self.error.or(Some(err)),
            }
        }
        self
    }

    /// Compiles and sorts both tables.
    pub fn build(self) -> Result<Router<R>, Error> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let pages = RouteTable::new(self.pages)?;
        let api = RouteTable::new(self.api)?;
        debug!(pages = pages.len(), api = api.len(), "built route tables");

        Ok(Router {
            renderer: self.renderer,
            pages,
            api,
        })
    }
}

#[doc(hidden)]
pub struct MakeRouterService<R: PageRenderer>(RouterService<R>);

impl<R: PageRenderer, T> Service<T> for MakeRouterService<R> {
    type Response = RouterService<R>;
    type Error = hyper::Error;
    type Future = future::Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _: T) -> Self::Future {
        let service = self.0.clone();
        future::ok(service)
    }
}

#[doc(hidden)]
pub struct RouterService<R: PageRenderer>(Arc<Router<R>>);

impl<R: PageRenderer> Clone for RouterService<R> {
    fn clone(&self) -> Self {
        RouterService(self.0.clone())
    }
}

impl<R: PageRenderer> Service<Request<Body>> for RouterService<R> {
    type Response = Response<Body>;
    type Error = hyper::Error;
    type Future = BoxFuture<'static, hyper::Result<Response<Body>>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let router = self.0.clone();
        Box::pin(async move { router.serve(req).await })
    }
}

impl<R: PageRenderer> Router<R> {
    /// Converts the `Router` into a `Service` which you can serve directly with `Hyper`.
    /// If you have an existing `Service` that you want to incorporate a `Router` into, see
    /// [`Router::serve`](crate::Router::serve).
    pub fn into_service(self) -> MakeRouterService<R> {
        MakeRouterService(RouterService(Arc::new(self)))
    }
}
