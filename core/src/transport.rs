//! The network seam.
//!
//! # Design
//! The orchestrator only knows `Transport::send`. `ReqwestTransport` is the
//! production implementation; tests inject in-memory transports to observe
//! exactly what reached the wire. A transport must fail with
//! `DispatchError::Cancelled` without doing any I/O when the options carry an
//! already-cancelled signal, and must return non-2xx statuses as data.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DispatchError;
use crate::headers::HeaderSet;
use crate::http::{HttpMethod, HttpResponse, RequestOptions};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, url: &str, options: &RequestOptions) -> Result<HttpResponse, DispatchError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, url: &str, options: &RequestOptions) -> Result<HttpResponse, DispatchError> {
        (**self).send(url, options).await
    }
}

/// `Transport` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, url: &str, options: &RequestOptions) -> Result<HttpResponse, DispatchError> {
        if options.is_cancelled() {
            return Err(DispatchError::Cancelled);
        }

        let mut builder = self.client.request(to_reqwest_method(options.method_or_default()), url);
        for (name, value) in options.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = &options.body {
            builder = builder.body(body.clone());
        }

        let round_trip = async {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let headers = collect_headers(response.headers());
            let body = response.text().await?;
            Ok::<_, reqwest::Error>(HttpResponse { status, headers, body })
        };

        let result = match &options.signal {
            Some(signal) => tokio::select! {
                biased;
                _ = signal.cancelled() => return Err(DispatchError::Cancelled),
                result = round_trip => result,
            },
            None => round_trip.await,
        };
        result.map_err(DispatchError::transport)
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Options => reqwest::Method::OPTIONS,
    }
}

/// Repeated header names are folded into one comma-separated value.
fn collect_headers(headers: &reqwest::header::HeaderMap) -> HeaderSet {
    let mut set = HeaderSet::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else { continue };
        let merged = match set.get(name.as_str()) {
            Some(prev) => format!("{prev}, {value}"),
            None => value.to_string(),
        };
        set.set(name.as_str(), merged);
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blacklist::aborted_signal;

    #[tokio::test]
    async fn aborted_signal_fails_before_any_io() {
        let transport = ReqwestTransport::new();
        let mut options = RequestOptions::new();
        options.signal = Some(aborted_signal());
        // Port 1 is never listening; a cancellation error proves no connect was attempted.
        let err = transport.send("http://127.0.0.1:1/", &options).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn invalid_url_is_a_transport_error() {
        let transport = ReqwestTransport::new();
        let err = transport.send("/relative", &RequestOptions::new()).await.unwrap_err();
        assert!(matches!(err, DispatchError::Transport(_)));
    }

    #[test]
    fn repeated_response_headers_are_folded() {
        let mut map = reqwest::header::HeaderMap::new();
        map.append("set-cookie", "a=1".parse().unwrap());
        map.append("set-cookie", "b=2".parse().unwrap());
        map.insert("content-type", "text/plain".parse().unwrap());
        let set = collect_headers(&map);
        assert_eq!(set.get("set-cookie"), Some("a=1, b=2"));
        assert_eq!(set.get("content-type"), Some("text/plain"));
    }

    #[test]
    fn methods_map_one_to_one() {
        assert_eq!(to_reqwest_method(HttpMethod::Get), reqwest::Method::GET);
        assert_eq!(to_reqwest_method(HttpMethod::Patch), reqwest::Method::PATCH);
        assert_eq!(to_reqwest_method(HttpMethod::Options), reqwest::Method::OPTIONS);
    }
}
