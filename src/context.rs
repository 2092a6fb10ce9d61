//! The per-request state handed to API handlers.
use crate::pattern::Params;

use hyper::header::{HeaderName, HeaderValue};
use hyper::{Body, HeaderMap, Request, Response, StatusCode};
use tokio::sync::oneshot;

/// Everything a handler needs to answer one request.
///
/// ```rust
/// use filerouter::{BoxError, RequestContext};
///
/// async fn show(ctx: RequestContext) -> Result<(), BoxError> {
///     let id = ctx.params.get("id").unwrap_or("unknown").to_owned();
///     ctx.res.end(format!("post {}", id));
///     Ok(())
/// }
/// ```
pub struct RequestContext {
    /// The inbound request.
    pub req: Request<Body>,
    /// The outbound response. Ending it commits the response.
    pub res: ResponseWriter,
    /// The parameters captured by the matched route.
    pub params: Params,
}

/// A write-once response.
///
/// Status and headers may be changed until [`end`](ResponseWriter::end) or
/// [`send`](ResponseWriter::send) consumes the writer. A writer dropped
/// without being ended leaves the request unterminated, which the dispatcher
/// answers with a 500.
#[derive(Debug)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    tx: oneshot::Sender<Response<Body>>,
}

impl ResponseWriter {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<Response<Body>>) {
        let (tx, rx) = oneshot::channel();
        let writer = Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            tx,
        };
        (writer, rx)
    }

    /// The status that will be sent. Defaults to `200 OK`.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    /// Sets a header, replacing any previous value.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Ends the response with `body`.
    pub fn end(self, body: impl Into<Body>) {
        let mut response = Response::new(body.into());
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        // the receiver lives until the handler settles
        let _ = self.tx.send(response);
    }

    /// Sends a fully built response, ignoring the status and headers set on
    /// the writer.
    pub fn send(self, response: Response<Body>) {
        let _ = self.tx.send(response);
    }
}
