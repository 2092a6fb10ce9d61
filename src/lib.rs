//! # FileRouter
//!
//! FileRouter is a file-route-style HTTP dispatcher for [hyper](https://hyper.rs).
//!
//! Routes are described by string patterns, usually derived from the layout of
//! a `routes/` directory: `routes/users/$id.api.rs` serves `/users/$id`. The
//! router compiles every pattern once, sorts the route table by specificity,
//! and resolves each request to exactly one route with a linear scan.
//!
//! ## Features
//!
//! **Most specific route wins:** Patterns may overlap. `/posts/new` and
//! `/posts/$id` can live side by side, and a request for `/posts/new` always
//! reaches the literal route. Catch-alls like `/$$rest` are only tried after
//! every other route, regardless of the order routes were registered in.
//!
//! **Parameters in your routing pattern:** Give a path segment a name and the
//! router delivers its value to your handler. Segments can be optional
//! (`$id?`), hold several parameters (`$from-$to`), or swallow the rest of the
//! path (`$$rest`).
//!
//! **Pages and APIs:** A router holds two tables. Page routes are rendered to
//! HTML by a [`PageRenderer`] you supply, API routes are answered by per-method
//! handlers collected in an [`ApiModule`]. Page routes are always tried first.
//!
//! **HTTP-ly correct failures:** Unknown paths get a 404, known paths without a
//! handler for the method get a 405 with an `Allow` header, and handler errors,
//! panics, or handlers that forget to answer get a 500. Failure details are
//! logged through [tracing](https://docs.rs/tracing), never sent to the client.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use filerouter::{ApiModule, BoxError, RequestContext, Router};
//! use hyper::{header, StatusCode};
//!
//! async fn list(ctx: RequestContext) -> Result<(), BoxError> {
//!     ctx.res.end("[]");
//!     Ok(())
//! }
//!
//! async fn show(ctx: RequestContext) -> Result<(), BoxError> {
//!     let id = ctx.params.get("id").unwrap_or_default().to_owned();
//!     let mut res = ctx.res;
//!     res.set_status(StatusCode::OK)
//!         .set_header(header::CONTENT_TYPE, "application/json".parse()?);
//!     res.end(format!(r#"{{"id":"{}"}}"#, id));
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = Router::builder()
//!         .api_module("/posts", ApiModule::new().get(list))
//!         .api_module("/posts/$id", ApiModule::new().get(show))
//!         .build()?;
//!
//!     hyper::Server::bind(&([127, 0, 0, 1], 3000).into())
//!         .serve(router.into_service())
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ### Named parameters
//!
//! `$name` matches a single path segment:
//!
//! ```ignore
//! Pattern: /user/$user
//!
//!  /user/gordon              match
//!  /user/gordon/             match
//!  /user/gordon/profile      no match
//!  /user/                    no match
//! ```
//!
//! ### Optional parameters
//!
//! `$name?` makes the whole segment optional. Absent parameters are missing
//! from [`Params`], not empty:
//!
//! ```ignore
//! Pattern: /posts/$id?
//!
//!  /posts                    match
//!  /posts/42                 match: id="42"
//! ```
//!
//! ### Catch-All parameters
//!
//! `$$name` matches everything up to the end of the path, so it must always be
//! the **end** of the pattern:
//!
//! ```ignore
//! Pattern: /src/$$filepath
//!
//!  /src/somefile.rs          match: filepath="somefile.rs"
//!  /src/subdir/somefile.rs   match: filepath="subdir/somefile.rs"
//! ```
//!
//! ### Pages
//!
//! ```rust
//! use filerouter::{BoxError, Params, PageRenderer, RouterBuilder};
//!
//! struct Markup;
//!
//! impl PageRenderer for Markup {
//!     type Page = &'static str;
//!
//!     fn render(&self, page: &'static str, _: &Params) -> Result<String, BoxError> {
//!         Ok(format!("<html><body>{}</body></html>", page))
//!     }
//! }
//!
//! let router = RouterBuilder::with_renderer(Markup)
//!     .page("", || async { Ok::<_, BoxError>("Welcome!") })
//!     .build()
//!     .unwrap();
//! assert!(router.lookup("/").is_some());
//! ```
//!
//! ### Module discovery
//!
//! Routes discovered by a build step or a directory walk can be registered by
//! their module key. The [`Config`] names the routes directory and the suffixes
//! that mark API and page modules, and can be loaded from TOML.

#![forbid(unsafe_code)]

mod compare;
pub mod config;
mod context;
pub mod discovery;
mod error;
mod method;
mod module;
pub(crate) mod path;
mod pattern;
mod provider;
#[doc(hidden)]
pub mod router;
mod table;

#[doc(inline)]
pub use compare::compare;
#[doc(inline)]
pub use config::Config;
#[doc(inline)]
pub use context::{RequestContext, ResponseWriter};
#[doc(inline)]
pub use error::{BoxError, DispatchError, Error};
#[doc(inline)]
pub use method::MethodKey;
#[doc(inline)]
pub use module::{ApiModule, Handler};
#[doc(inline)]
pub use pattern::{Params, Pattern};
#[doc(inline)]
pub use provider::Provider;
#[doc(inline)]
pub use router::{NoPages, PageRenderer, RouteKind, RouteMatch, Router, RouterBuilder};
#[doc(inline)]
pub use table::{Entry, RouteTable};
