//! HTTP request and response types as plain data.
//!
//! # Design
//! The orchestrator never touches sockets; it shapes `RequestOptions` and
//! hands them to a `Transport`. All fields use owned types so options can be
//! moved into `'static` interceptor futures without lifetime juggling.

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::headers::HeaderSet;

/// Cancellation signal attached to a request. The transport must fail fast
/// when it is already cancelled.
pub type CancelSignal = CancellationToken;

/// HTTP method for a request. `Get` is the default applied to calls that do
/// not name one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

/// Per-call request options. Private to a single dispatch and mutated in
/// place across its stages; interceptors may also replace it wholesale.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// `None` until the dispatch normalizes it to `HttpMethod::Get`.
    pub method: Option<HttpMethod>,
    pub headers: HeaderSet,
    pub body: Option<String>,
    pub signal: Option<CancelSignal>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// The method the transport should use.
    pub fn method_or_default(&self) -> HttpMethod {
        self.method.unwrap_or_default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

/// An already-built request handed in as a dispatch target. Only `url` takes
/// part in resolution; method, headers and body come from `RequestOptions`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderSet,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: HeaderSet::new(),
            body: None,
        }
    }
}

/// An HTTP response described as plain data. Any status is a valid response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderSet,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderSet::new(),
            body: body.into(),
        }
    }

    /// True for 2xx statuses.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}
