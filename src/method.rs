use std::fmt;

use hyper::Method;

/// The keys an [`ApiModule`](crate::ApiModule) can register handlers under.
///
/// `All` is the fallback used when a module has no handler for the request
/// method itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MethodKey {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    All,
}

impl MethodKey {
    pub(crate) const COUNT: usize = 8;

    /// Every key in the order `Allow` headers list them.
    pub const ALL_KEYS: [MethodKey; MethodKey::COUNT] = [
        MethodKey::Get,
        MethodKey::Post,
        MethodKey::Put,
        MethodKey::Delete,
        MethodKey::Patch,
        MethodKey::Options,
        MethodKey::Head,
        MethodKey::All,
    ];

    /// Maps a request method onto its key. Methods without a dedicated key
    /// (`CONNECT`, `TRACE`, extensions) return `None` and can only be served
    /// by an `All` handler.
    pub fn from_method(method: &Method) -> Option<Self> {
        let key = match *method {
            Method::GET => MethodKey::Get,
            Method::POST => MethodKey::Post,
            Method::PUT => MethodKey::Put,
            Method::DELETE => MethodKey::Delete,
            Method::PATCH => MethodKey::Patch,
            Method::OPTIONS => MethodKey::Options,
            Method::HEAD => MethodKey::Head,
            _ => return None,
        };
        Some(key)
    }

    /// The position of this key in a module's handler table.
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// The HTTP method name, or `None` for `All`.
    pub fn as_method(self) -> Option<Method> {
        match self {
            MethodKey::Get => Some(Method::GET),
            MethodKey::Post => Some(Method::POST),
            MethodKey::Put => Some(Method::PUT),
            MethodKey::Delete => Some(Method::DELETE),
            MethodKey::Patch => Some(Method::PATCH),
            MethodKey::Options => Some(Method::OPTIONS),
            MethodKey::Head => Some(Method::HEAD),
            MethodKey::All => None,
        }
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_method() {
            Some(method) => f.write_str(method.as_str()),
            None => f.write_str("ALL"),
        }
    }
}
