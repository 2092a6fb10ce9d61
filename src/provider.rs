use crate::error::BoxError;

use std::future::Future;

use futures_util::future::BoxFuture;

/// Lazily yields what a route serves: an [`ApiModule`](crate::ApiModule) for
/// API routes, or the renderer's page type for page routes.
///
/// Any `Fn() -> impl Future<Output = Result<T, BoxError>>` is a provider, so
/// a route backed by a value that always exists is simply:
///
/// ```rust
/// # use filerouter::{ApiModule, BoxError, Provider};
/// # use std::sync::Arc;
/// let module = Arc::new(ApiModule::new());
/// let provider = move || {
///     let module = module.clone();
///     async move { Ok::<_, BoxError>(module) }
/// };
/// # fn assert_provider<P: Provider<Arc<ApiModule>>>(_: &P) {}
/// # assert_provider(&provider);
/// ```
pub trait Provider<T>: Send + Sync {
    fn resolve(&self) -> BoxFuture<'static, Result<T, BoxError>>;
}

impl<F, R, T> Provider<T> for F
where
    F: Fn() -> R + Send + Sync,
    R: Future<Output = Result<T, BoxError>> + Send + 'static,
{
    fn resolve(&self) -> BoxFuture<'static, Result<T, BoxError>> {
        Box::pin(self())
    }
}
