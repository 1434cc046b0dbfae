//! Interceptor handles and the collections that hold them.
//!
//! # Design
//! Interceptors are async closures behind an `Arc`. A `Handler` clone is the
//! same interceptor: identity is the `Arc` allocation, which is what the
//! duplicate-suppressing `InterceptorSet` keys on. Registering a clone of a
//! handler that is already present is a no-op and does not move it.
//!
//! Route handlers live in a `RouteTable` keyed by the pattern's source text
//! and tested in insertion order.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use parking_lot::RwLock;
use regex::Regex;

use crate::error::DispatchError;
use crate::http::{HttpResponse, RequestOptions};

/// `(resolved_url, options) -> options`
pub type RequestFn = dyn Fn(String, RequestOptions) -> BoxFuture<'static, Result<RequestOptions, DispatchError>>
    + Send
    + Sync;

/// `(final_options, response) -> response`
pub type ResponseFn = dyn Fn(RequestOptions, HttpResponse) -> BoxFuture<'static, Result<HttpResponse, DispatchError>>
    + Send
    + Sync;

/// `(resolved_url, options) -> response`
pub type RouteFn = dyn Fn(String, RequestOptions) -> BoxFuture<'static, Result<HttpResponse, DispatchError>>
    + Send
    + Sync;

pub type RequestInterceptor = Handler<RequestFn>;
pub type ResponseInterceptor = Handler<ResponseFn>;
pub type RouteInterceptor = Handler<RouteFn>;

/// Reference-counted interceptor. Clones share identity.
pub struct Handler<F: ?Sized>(Arc<F>);

impl<F: ?Sized> Handler<F> {
    fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    /// True when both handles point at the same interceptor.
    pub fn same(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl<F: ?Sized> Clone for Handler<F> {
    fn clone(&self) -> Self {
        Handler(Arc::clone(&self.0))
    }
}

impl<F: ?Sized> fmt::Debug for Handler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:#x})", self.identity())
    }
}

impl Handler<RequestFn> {
    pub fn new<C, Fut>(f: C) -> Self
    where
        C: Fn(String, RequestOptions) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RequestOptions, DispatchError>> + Send + 'static,
    {
        let handler: Arc<RequestFn> =
            Arc::new(move |url: String, opts: RequestOptions| f(url, opts).boxed());
        Handler(handler)
    }

    pub fn call(
        &self,
        url: String,
        opts: RequestOptions,
    ) -> BoxFuture<'static, Result<RequestOptions, DispatchError>> {
        (self.0)(url, opts)
    }
}

impl Handler<ResponseFn> {
    pub fn new<C, Fut>(f: C) -> Self
    where
        C: Fn(RequestOptions, HttpResponse) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, DispatchError>> + Send + 'static,
    {
        let handler: Arc<ResponseFn> =
            Arc::new(move |opts: RequestOptions, resp: HttpResponse| f(opts, resp).boxed());
        Handler(handler)
    }

    pub fn call(
        &self,
        opts: RequestOptions,
        resp: HttpResponse,
    ) -> BoxFuture<'static, Result<HttpResponse, DispatchError>> {
        (self.0)(opts, resp)
    }
}

impl Handler<RouteFn> {
    pub fn new<C, Fut>(f: C) -> Self
    where
        C: Fn(String, RequestOptions) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, DispatchError>> + Send + 'static,
    {
        let handler: Arc<RouteFn> =
            Arc::new(move |url: String, opts: RequestOptions| f(url, opts).boxed());
        Handler(handler)
    }

    pub fn call(
        &self,
        url: String,
        opts: RequestOptions,
    ) -> BoxFuture<'static, Result<HttpResponse, DispatchError>> {
        (self.0)(url, opts)
    }
}

struct Members<F: ?Sized> {
    order: Vec<Handler<F>>,
    ids: HashSet<usize>,
}

/// Insertion-ordered, duplicate-suppressing set of interceptors.
pub struct InterceptorSet<F: ?Sized> {
    inner: RwLock<Members<F>>,
}

impl<F: ?Sized> Default for InterceptorSet<F> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Members {
                order: Vec::new(),
                ids: HashSet::new(),
            }),
        }
    }
}

impl<F: ?Sized> InterceptorSet<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the interceptor is already registered; its position
    /// is left unchanged.
    pub fn add(&self, handler: Handler<F>) -> bool {
        let mut inner = self.inner.write();
        if !inner.ids.insert(handler.identity()) {
            return false;
        }
        inner.order.push(handler);
        true
    }

    pub fn delete(&self, handler: &Handler<F>) -> bool {
        let mut inner = self.inner.write();
        let id = handler.identity();
        if !inner.ids.remove(&id) {
            return false;
        }
        inner.order.retain(|h| h.identity() != id);
        true
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.order.clear();
        inner.ids.clear();
    }

    pub fn contains(&self, handler: &Handler<F>) -> bool {
        self.inner.read().ids.contains(&handler.identity())
    }

    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().order.is_empty()
    }

    /// The registered interceptors in insertion order.
    pub fn snapshot(&self) -> Vec<Handler<F>> {
        self.inner.read().order.clone()
    }

    /// First registered interceptor whose identity is not in `visited`, which
    /// is then marked visited. Walking a chain with this reads the live set
    /// at every step: handlers added mid-chain are reached, handlers deleted
    /// before their turn are skipped.
    pub fn next_unvisited(&self, visited: &mut HashSet<usize>) -> Option<Handler<F>> {
        let inner = self.inner.read();
        let next = inner.order.iter().find(|h| !visited.contains(&h.identity()))?;
        visited.insert(next.identity());
        Some(next.clone())
    }
}

impl<F: ?Sized> fmt::Debug for InterceptorSet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.read().order.iter()).finish()
    }
}

/// Pattern-keyed route handlers, tested in insertion order.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: RwLock<Vec<(Regex, RouteInterceptor)>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `pattern`. Re-registering a pattern with the
    /// same source text replaces its handler and keeps its position.
    pub fn set(&self, pattern: Regex, handler: RouteInterceptor) {
        let mut routes = self.routes.write();
        match routes.iter_mut().find(|(p, _)| p.as_str() == pattern.as_str()) {
            Some(entry) => entry.1 = handler,
            None => routes.push((pattern, handler)),
        }
    }

    pub fn delete(&self, pattern: &Regex) -> bool {
        let mut routes = self.routes.write();
        let before = routes.len();
        routes.retain(|(p, _)| p.as_str() != pattern.as_str());
        routes.len() != before
    }

    pub fn clear(&self) {
        self.routes.write().clear();
    }

    pub fn len(&self) -> usize {
        self.routes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.read().is_empty()
    }

    /// First route whose pattern matches `url`, with the pattern source.
    pub fn find(&self, url: &str) -> Option<(String, RouteInterceptor)> {
        self.routes
            .read()
            .iter()
            .find(|(pattern, _)| pattern.is_match(url))
            .map(|(pattern, handler)| (pattern.as_str().to_string(), handler.clone()))
    }
}

/// The three interception collections of a client.
#[derive(Debug, Default)]
pub struct Intercept {
    pub request: InterceptorSet<RequestFn>,
    pub response: InterceptorSet<ResponseFn>,
    pub route: RouteTable,
}

impl Intercept {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every interceptor and route.
    pub fn clear(&self) {
        self.request.clear();
        self.response.clear();
        self.route.clear();
    }
}
