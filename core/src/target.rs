//! Request targets and base-URL resolution.

use url::Url;

use crate::http::HttpRequest;

/// What a dispatch fetches: a literal URL string, a parsed URL, or an
/// already-built request carrying its own URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestTarget {
    Str(String),
    Url(Url),
    Request(HttpRequest),
}

impl RequestTarget {
    /// Canonical string form: strings unchanged, URLs fully qualified,
    /// requests by their carried URL.
    pub fn resolve(&self) -> &str {
        match self {
            RequestTarget::Str(s) => s,
            RequestTarget::Url(url) => url.as_str(),
            RequestTarget::Request(req) => &req.url,
        }
    }
}

impl From<&str> for RequestTarget {
    fn from(value: &str) -> Self {
        RequestTarget::Str(value.to_string())
    }
}

impl From<String> for RequestTarget {
    fn from(value: String) -> Self {
        RequestTarget::Str(value)
    }
}

impl From<&String> for RequestTarget {
    fn from(value: &String) -> Self {
        RequestTarget::Str(value.clone())
    }
}

impl From<Url> for RequestTarget {
    fn from(value: Url) -> Self {
        RequestTarget::Url(value)
    }
}

impl From<HttpRequest> for RequestTarget {
    fn from(value: HttpRequest) -> Self {
        RequestTarget::Request(value)
    }
}

/// Join `base` and `path` with exactly one `/` at the seam. An empty base
/// returns `path` unchanged.
pub fn join_url(base: &str, path: &str) -> String {
    if base.is_empty() {
        return path.to_string();
    }
    let base = base.strip_suffix('/').unwrap_or(base);
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// True when `url` starts with `http`. Anything so prefixed, including a
/// bare `httpbin/get`, bypasses base joining.
pub fn is_absolute(url: &str) -> bool {
    url.starts_with("http")
}

/// Rewrite a relative target against `base`. Absolute targets and an empty
/// base leave the target untouched.
pub(crate) fn apply_base(base: &str, target: RequestTarget) -> RequestTarget {
    if base.is_empty() || is_absolute(target.resolve()) {
        return target;
    }
    RequestTarget::Str(join_url(base, target.resolve()))
}
