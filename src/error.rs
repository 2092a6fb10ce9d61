//! Error types for route-table construction and request dispatch.
use crate::method::MethodKey;

use hyper::{Method, StatusCode};
use thiserror::Error;

/// A type-erased error raised by a handler or a provider.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building a [`Router`](crate::Router).
///
/// These are configuration bugs, so they are reported once at startup and
/// never at request time.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed route pattern `{pattern}`: {reason}")]
    MalformedPattern { pattern: String, reason: String },

    #[error("module key `{key}` does not look like `{prefix}...{suffix}`")]
    UnrecognizedModule {
        key: String,
        prefix: String,
        suffix: String,
    },

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn malformed(pattern: &str, reason: impl Into<String>) -> Self {
        Error::MalformedPattern {
            pattern: pattern.to_owned(),
            reason: reason.into(),
        }
    }
}

/// The ways a single request can fail to reach a handler's response.
///
/// Every variant maps onto a terminal status; none of them escape the
/// dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no route matches the request path")]
    RouteNotFound,

    #[error("route has no handler for {method}")]
    MethodNotSupported {
        method: Method,
        /// The methods the route does answer.
        allowed: Vec<MethodKey>,
    },

    #[error("handler failed: {0}")]
    HandlerFailure(#[source] BoxError),

    #[error("handler panicked: {0}")]
    HandlerPanicked(String),

    #[error("handler returned without ending the response")]
    UnterminatedResponse,
}

impl DispatchError {
    /// The status code sent to the client for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::RouteNotFound => StatusCode::NOT_FOUND,
            DispatchError::MethodNotSupported { .. } => StatusCode::METHOD_NOT_ALLOWED,
            DispatchError::HandlerFailure(_)
            | DispatchError::HandlerPanicked(_)
            | DispatchError::UnterminatedResponse => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The plain-text body sent to the client. Failure details are never
    /// included.
    pub fn body(&self) -> &'static str {
        match self {
            DispatchError::RouteNotFound => "Not found",
            DispatchError::MethodNotSupported { .. } => "Method not allowed",
            _ => "Internal server error",
        }
    }
}
