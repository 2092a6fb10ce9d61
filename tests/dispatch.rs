use filerouter::{
    ApiModule, BoxError, Config, Error, PageRenderer, Params, RequestContext, Router,
    RouterBuilder,
};
use futures_util::future::BoxFuture;
use hyper::{body, header, Body, Method, Request, Response, StatusCode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn text(response: Response<Body>) -> (StatusCode, String) {
    let status = response.status();
    let bytes = body::to_bytes(response.into_body()).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get<R: PageRenderer>(router: &Router<R>, uri: &str) -> (StatusCode, String) {
    text(router.serve(request(Method::GET, uri)).await.unwrap()).await
}

// answers with the pattern name and the sorted params
fn echo(name: &'static str) -> impl Fn(RequestContext) -> BoxFuture<'static, Result<(), BoxError>> {
    move |ctx: RequestContext| -> BoxFuture<'static, Result<(), BoxError>> {
        let mut params: Vec<_> = ctx
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        params.sort();
        let body = format!("{} {}", name, params.join(","));
        Box::pin(async move {
            ctx.res.end(body);
            Ok::<(), BoxError>(())
        })
    }
}

fn blog() -> Router {
    Router::builder()
        .api_module("/$$all", ApiModule::new().get(echo("all")))
        .api_module("/posts/$id", ApiModule::new().get(echo("post")))
        .api_module("/posts/new", ApiModule::new().get(echo("new")))
        .api_module("/about", ApiModule::new().get(echo("about")))
        .api_module("/archive/$year?", ApiModule::new().get(echo("archive")))
        .build()
        .unwrap()
}

#[tokio::test]
async fn literal_route_beats_parameter() {
    let router = blog();
    assert_eq!(get(&router, "/posts/new").await, (StatusCode::OK, "new ".into()));
    assert_eq!(
        get(&router, "/posts/42").await,
        (StatusCode::OK, "post id=42".into())
    );
    assert_eq!(
        get(&router, "/posts/42/").await,
        (StatusCode::OK, "post id=42".into())
    );
}

#[tokio::test]
async fn catch_all_is_tried_last() {
    let router = blog();
    assert_eq!(get(&router, "/about").await, (StatusCode::OK, "about ".into()));
    assert_eq!(
        get(&router, "/somewhere/else").await,
        (StatusCode::OK, "all all=somewhere/else".into())
    );
}

#[tokio::test]
async fn catch_all_keeps_separators() {
    let router = Router::builder()
        .api_module("/files/$$rest", ApiModule::new().get(echo("files")))
        .api_module("/files/readme", ApiModule::new().get(echo("readme")))
        .build()
        .unwrap();

    assert_eq!(
        get(&router, "/files/a/b/c").await,
        (StatusCode::OK, "files rest=a/b/c".into())
    );
    assert_eq!(get(&router, "/files/readme").await, (StatusCode::OK, "readme ".into()));
    assert_eq!(get(&router, "/files").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn optional_parameter_is_absent_not_empty() {
    let router = blog();
    assert_eq!(get(&router, "/archive").await, (StatusCode::OK, "archive ".into()));
    assert_eq!(
        get(&router, "/archive/2021").await,
        (StatusCode::OK, "archive year=2021".into())
    );
}

#[tokio::test]
async fn query_and_fragment_are_ignored() {
    let router = blog();
    assert_eq!(
        get(&router, "/posts/7?comments=true").await,
        (StatusCode::OK, "post id=7".into())
    );
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let router = Router::builder()
        .api_module("/about", ApiModule::new().get(echo("about")))
        .build()
        .unwrap();

    let response = router.serve(request(Method::GET, "/missing")).await.unwrap();
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(text(response).await, (StatusCode::NOT_FOUND, "Not found".into()));
}

#[tokio::test]
async fn unsupported_method_is_not_allowed() {
    let router = Router::builder()
        .api_module(
            "/posts",
            ApiModule::new().get(echo("list")).post(echo("create")),
        )
        .build()
        .unwrap();

    let response = router.serve(request(Method::DELETE, "/posts")).await.unwrap();
    assert_eq!(response.headers()[header::ALLOW], "GET, POST");
    assert_eq!(
        text(response).await,
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".into())
    );

    let response = router.serve(request(Method::POST, "/posts")).await.unwrap();
    assert_eq!(text(response).await, (StatusCode::OK, "create ".into()));
}

#[tokio::test]
async fn all_handler_is_the_fallback() {
    let router = Router::builder()
        .api_module(
            "/rpc",
            ApiModule::new().get(echo("get")).all(echo("all")),
        )
        .build()
        .unwrap();

    for method in [Method::PUT, Method::PATCH, Method::TRACE].iter() {
        let response = router.serve(request(method.clone(), "/rpc")).await.unwrap();
        assert_eq!(text(response).await, (StatusCode::OK, "all ".into()));
    }

    let response = router.serve(request(Method::GET, "/rpc")).await.unwrap();
    assert_eq!(text(response).await, (StatusCode::OK, "get ".into()));
}

async fn broken(_: RequestContext) -> Result<(), BoxError> {
    Err("connection refused: db.internal:5432".into())
}

async fn panicking(_: RequestContext) -> Result<(), BoxError> {
    panic!("index out of bounds")
}

async fn silent(_: RequestContext) -> Result<(), BoxError> {
    Ok(())
}

async fn ends_then_fails(ctx: RequestContext) -> Result<(), BoxError> {
    ctx.res.end("committed");
    Err("late failure".into())
}

#[tokio::test]
async fn handler_failures_are_internal_errors() {
    let router = Router::builder()
        .api_module("/broken", ApiModule::new().get(broken))
        .api_module("/panicking", ApiModule::new().get(panicking))
        .api_module("/silent", ApiModule::new().get(silent))
        .build()
        .unwrap();

    for path in ["/broken", "/panicking", "/silent"].iter() {
        assert_eq!(
            get(&router, path).await,
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".into()
            ),
            "path: {}",
            path
        );
    }
}

#[tokio::test]
async fn committed_response_survives_a_late_failure() {
    let router = Router::builder()
        .api_module("/late", ApiModule::new().get(ends_then_fails))
        .build()
        .unwrap();
    assert_eq!(get(&router, "/late").await, (StatusCode::OK, "committed".into()));
}

#[tokio::test]
async fn provider_failure_is_an_internal_error() {
    let router = Router::builder()
        .api("/lazy", || async {
            Err::<Arc<ApiModule>, BoxError>("module failed to load".into())
        })
        .build()
        .unwrap();
    assert_eq!(
        get(&router, "/lazy").await,
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".into()
        )
    );
}

#[tokio::test]
async fn provider_is_resolved_per_request() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let module = Arc::new(ApiModule::new().get(echo("counted")));

    let router = Router::builder()
        .api("/counted", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let module = module.clone();
            async move { Ok::<_, BoxError>(module) }
        })
        .build()
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    get(&router, "/counted").await;
    get(&router, "/counted").await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn repeated_dispatch_is_idempotent() {
    let router = blog();
    let first = get(&router, "/posts/9").await;
    for _ in 0..3 {
        assert_eq!(get(&router, "/posts/9").await, first);
    }
    assert_eq!(router.lookup("/posts/9"), router.lookup("/posts/9"));
}

#[tokio::test]
async fn handlers_see_the_request() {
    async fn method_echo(ctx: RequestContext) -> Result<(), BoxError> {
        let method = ctx.req.method().to_string();
        let mut res = ctx.res;
        res.set_status(StatusCode::ACCEPTED)
            .set_header(header::CONTENT_TYPE, "text/x-method".parse()?);
        res.end(method);
        Ok(())
    }

    let router = Router::builder()
        .api_module("/echo", ApiModule::new().all(method_echo))
        .build()
        .unwrap();

    let response = router.serve(request(Method::PATCH, "/echo")).await.unwrap();
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/x-method");
    assert_eq!(text(response).await, (StatusCode::ACCEPTED, "PATCH".into()));
}

struct Shell;

impl PageRenderer for Shell {
    type Page = &'static str;

    fn render(&self, page: &'static str, params: &Params) -> Result<String, BoxError> {
        if page == "broken" {
            return Err("template error".into());
        }
        let slug = params.get("slug").unwrap_or("-");
        Ok(format!("<html><body>{} {}</body></html>", page, slug))
    }
}

fn site() -> Router<Shell> {
    RouterBuilder::with_renderer(Shell)
        .page("", || async { Ok::<_, BoxError>("home") })
        .page("/blog/$slug", || async { Ok::<_, BoxError>("article") })
        .page("/oops", || async { Ok::<_, BoxError>("broken") })
        .api_module("/blog/$slug", ApiModule::new().get(echo("api")))
        .api_module("/api/health", ApiModule::new().get(echo("health")))
        .build()
        .unwrap()
}

#[tokio::test]
async fn pages_are_rendered_as_html() {
    let router = site();

    let response = router.serve(request(Method::GET, "/")).await.unwrap();
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/html; charset=utf-8"
    );
    assert_eq!(
        text(response).await,
        (
            StatusCode::OK,
            "<!DOCTYPE html><html><body>home -</body></html>".into()
        )
    );
}

#[tokio::test]
async fn pages_take_priority_over_api_routes() {
    let router = site();
    assert_eq!(
        get(&router, "/blog/hello").await,
        (
            StatusCode::OK,
            "<!DOCTYPE html><html><body>article hello</body></html>".into()
        )
    );
    assert_eq!(
        get(&router, "/api/health").await,
        (StatusCode::OK, "health ".into())
    );
}

#[tokio::test]
async fn render_failure_is_an_internal_error() {
    let router = site();
    assert_eq!(
        get(&router, "/oops").await,
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".into()
        )
    );
}

#[tokio::test]
async fn routes_from_discovered_modules() {
    let config = Config::default();
    let users = Arc::new(ApiModule::new().get(echo("users")));
    let user = Arc::new(ApiModule::new().get(echo("user")));

    let provider = |module: Arc<ApiModule>| {
        move || {
            let module = module.clone();
            async move { Ok::<_, BoxError>(module) }
        }
    };

    let router = Router::builder()
        .api_modules(
            &config,
            vec![
                ("./routes/users/index.api.rs", provider(users)),
                ("./routes/users/$id.api.rs", provider(user)),
            ],
        )
        .build()
        .unwrap();

    assert_eq!(get(&router, "/users").await, (StatusCode::OK, "users ".into()));
    assert_eq!(
        get(&router, "/users/ada").await,
        (StatusCode::OK, "user id=ada".into())
    );
}

#[tokio::test]
async fn pages_from_discovered_modules() {
    let config = Config::default();
    let page = |name: &'static str| move || async move { Ok::<_, BoxError>(name) };

    let router = RouterBuilder::with_renderer(Shell)
        .page_modules(
            &config,
            vec![
                ("./routes/index.page.rs", page("home")),
                ("./routes/blog/$slug.page.rs", page("article")),
            ],
        )
        .build()
        .unwrap();

    assert_eq!(
        get(&router, "/").await,
        (
            StatusCode::OK,
            "<!DOCTYPE html><html><body>home -</body></html>".into()
        )
    );
    assert_eq!(
        get(&router, "/blog/x").await,
        (
            StatusCode::OK,
            "<!DOCTYPE html><html><body>article x</body></html>".into()
        )
    );
}

#[test]
fn page_modules_reject_api_keys() {
    let page = || async { Ok::<_, BoxError>("about") };
    let result = RouterBuilder::with_renderer(Shell)
        .page_modules(&Config::default(), vec![("./routes/about.api.rs", page)])
        .build();
    assert!(matches!(result, Err(Error::UnrecognizedModule { .. })));
}

#[tokio::test]
async fn concurrent_dispatch_shares_one_router() {
    let router = Arc::new(blog());

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let router = router.clone();
            tokio::spawn(async move {
                let uri = format!("/posts/{}", i);
                let response = router.serve(request(Method::GET, &uri)).await.unwrap();
                text(response).await
            })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        assert_eq!(
            task.await.unwrap(),
            (StatusCode::OK, format!("post id={}", i))
        );
    }
}
