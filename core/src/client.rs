//! The dispatch orchestrator.
//!
//! # Design
//! `Client` owns the long-lived, externally mutable state (base URL, default
//! headers, blacklist, interceptors) and a `Transport`. Each `dispatch` runs
//! one strictly linear pipeline:
//!
//! 1. normalize: default the method to GET, resolve the target, join the base
//! 2. gate: blacklisted targets go straight to the transport with an
//!    already-cancelled signal
//! 3. overlay default headers
//! 4. request interceptors, in insertion order
//! 5. first matching route handler answers the call directly
//! 6. transport
//! 7. response interceptors, in insertion order
//!
//! Interceptor chains walk the live collections one step at a time, so an
//! interceptor added mid-chain still runs in the same call and one deleted
//! before its turn does not. Default headers are copied at the overlay stage.
//! No lock is held across an `.await`. A response interceptor may
//! re-enter `dispatch` on the same client (hold it through a `Weak` to avoid
//! a reference cycle); re-entry depth is not bounded.

use std::collections::HashSet;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::blacklist::{aborted_signal, Blacklist};
use crate::config::ClientConfig;
use crate::error::DispatchError;
use crate::headers::DefaultHeaders;
use crate::http::{CancelSignal, HttpMethod, HttpResponse, RequestOptions};
use crate::intercept::Intercept;
use crate::target::{apply_base, RequestTarget};
use crate::transport::{ReqwestTransport, Transport};

/// Interception client wrapping a `Transport`.
///
/// Holds the base URL, default headers, blacklist and interceptor
/// collections. All of them may be changed through `&self` at any time,
/// including while calls are in flight. Share it behind an `Arc`.
pub struct Client<T = ReqwestTransport> {
    transport: T,
    base: RwLock<String>,
    headers: DefaultHeaders,
    blacklist: Blacklist,
    intercept: Intercept,
    aborted: CancelSignal,
}

impl Default for Client<ReqwestTransport> {
    fn default() -> Self {
        Self::new(ReqwestTransport::new())
    }
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            base: RwLock::new(String::new()),
            headers: DefaultHeaders::new(),
            blacklist: Blacklist::new(),
            intercept: Intercept::new(),
            aborted: aborted_signal(),
        }
    }

    /// Build a client seeded with the base URL, default headers and
    /// blacklist entries from `config`.
    pub fn from_config(config: &ClientConfig, transport: T) -> Self {
        let client = Self::new(transport);
        client.set_base(config.base.as_str());
        for (name, value) in &config.headers {
            client.headers.set(name, value.as_str());
        }
        for entry in &config.blacklist {
            client.blacklist.add(entry.as_str());
        }
        client
    }

    pub fn base(&self) -> String {
        self.base.read().clone()
    }

    pub fn set_base(&self, base: impl Into<String>) {
        *self.base.write() = base.into();
    }

    pub fn headers(&self) -> &DefaultHeaders {
        &self.headers
    }

    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    pub fn intercept(&self) -> &Intercept {
        &self.intercept
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one request through the pipeline.
    ///
    /// Fails with `DispatchError::Cancelled` for blacklisted targets, and
    /// propagates interceptor and transport failures unchanged. Any HTTP
    /// status is returned as a normal response.
    pub async fn dispatch(
        &self,
        target: impl Into<RequestTarget>,
        options: Option<RequestOptions>,
    ) -> Result<HttpResponse, DispatchError> {
        let mut options = options.unwrap_or_default();
        options.method.get_or_insert(HttpMethod::Get);

        let target = target.into();
        let resolved = target.resolve().to_string();
        let target = apply_base(&self.base(), target);
        let url = target.resolve().to_string();
        debug!(method = options.method_or_default().as_str(), %url, "dispatch");

        if self.blacklist.is_blocked(&target, &resolved) {
            debug!(%url, "blocked by blacklist");
            options.signal = Some(self.aborted.clone());
            return self.transport.send(&url, &options).await;
        }

        options.headers = self.headers.apply(&options.headers);

        let mut visited = HashSet::new();
        while let Some(interceptor) = self.intercept.request.next_unvisited(&mut visited) {
            trace!(stage = visited.len() - 1, "request interceptor");
            options = interceptor.call(url.clone(), options).await?;
        }

        if let Some((pattern, handler)) = self.intercept.route.find(&url) {
            debug!(%url, %pattern, "route matched");
            return handler.call(url, options).await;
        }

        let mut response = self.transport.send(&url, &options).await?;
        debug!(%url, status = response.status, "transport completed");

        let mut visited = HashSet::new();
        while let Some(interceptor) = self.intercept.response.next_unvisited(&mut visited) {
            trace!(stage = visited.len() - 1, "response interceptor");
            response = interceptor.call(options.clone(), response).await?;
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;

    /// Records the last call and answers 200 "ok".
    #[derive(Default)]
    struct LastCall(Mutex<Option<(String, RequestOptions)>>);

    #[async_trait]
    impl Transport for LastCall {
        async fn send(&self, url: &str, options: &RequestOptions) -> Result<HttpResponse, DispatchError> {
            if options.is_cancelled() {
                return Err(DispatchError::Cancelled);
            }
            *self.0.lock() = Some((url.to_string(), options.clone()));
            Ok(HttpResponse::new(200, "ok"))
        }
    }

    fn client() -> Client<Arc<LastCall>> {
        Client::new(Arc::new(LastCall::default()))
    }

    fn last(client: &Client<Arc<LastCall>>) -> (String, RequestOptions) {
        client.transport().0.lock().clone().unwrap()
    }

    #[test]
    fn new_client_is_empty() {
        let client = client();
        assert_eq!(client.base(), "");
        assert!(client.headers().is_empty());
        assert!(client.blacklist().is_empty());
        assert!(client.intercept().request.is_empty());
        assert!(client.intercept().response.is_empty());
        assert!(client.intercept().route.is_empty());
    }

    #[tokio::test]
    async fn method_defaults_to_get() {
        let client = client();
        client.dispatch("http://h/x", None).await.unwrap();
        assert_eq!(last(&client).1.method, Some(HttpMethod::Get));
    }

    #[tokio::test]
    async fn explicit_method_is_kept() {
        let client = client();
        let opts = RequestOptions::new().with_method(HttpMethod::Delete);
        client.dispatch("http://h/x", Some(opts)).await.unwrap();
        assert_eq!(last(&client).1.method, Some(HttpMethod::Delete));
    }

    #[tokio::test]
    async fn base_is_read_per_call() {
        let client = client();
        client.set_base("http://one");
        client.dispatch("/x", None).await.unwrap();
        assert_eq!(last(&client).0, "http://one/x");

        client.set_base("http://two/");
        client.dispatch("x", None).await.unwrap();
        assert_eq!(last(&client).0, "http://two/x");
    }

    #[tokio::test]
    async fn from_config_seeds_state() {
        let config = ClientConfig::from_toml_str(
            r#"
            base = "http://h:9090"
            blacklist = ["/blocked"]
            [headers]
            authorization = "global"
            "#,
        )
        .unwrap();
        let client = Client::from_config(&config, Arc::new(LastCall::default()));
        assert_eq!(client.base(), "http://h:9090");

        client.dispatch("/echo", None).await.unwrap();
        let (url, opts) = last(&client);
        assert_eq!(url, "http://h:9090/echo");
        assert_eq!(opts.headers.get("authorization"), Some("global"));

        let err = client.dispatch("/blocked", None).await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
