//! Interception layer around an HTTP transport.
//!
//! # Overview
//! `Client::dispatch` composes a base-URL resolver, a default-header set,
//! ordered request and response interceptor chains, a regex-keyed route table
//! that short-circuits the network, and a blacklist that cancels matching
//! calls before they leave the process.
//!
//! # Design
//! - The network is a `Transport` trait object seam; `ReqwestTransport` is the
//!   production implementation and tests inject in-memory ones.
//! - All configuration lives on one `Client` value held by the application
//!   (usually in an `Arc`) instead of a process-wide global.
//! - Shared collections are internally synchronized and may be mutated while
//!   calls are in flight; each stage reads its collection when it starts.
//! - Logging goes through `tracing`; installing a subscriber is left to the
//!   embedding binary.

pub mod blacklist;
pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod http;
pub mod intercept;
pub mod target;
pub mod transport;

pub use blacklist::Blacklist;
pub use client::Client;
pub use config::ClientConfig;
pub use error::{BoxError, ConfigError, DispatchError};
pub use headers::{overlay, DefaultHeaders, HeaderSet};
pub use http::{CancelSignal, HttpMethod, HttpRequest, HttpResponse, RequestOptions};
pub use intercept::{
    Handler, Intercept, InterceptorSet, RequestInterceptor, ResponseInterceptor, RouteInterceptor,
    RouteTable,
};
pub use target::{is_absolute, join_url, RequestTarget};
pub use transport::{ReqwestTransport, Transport};
