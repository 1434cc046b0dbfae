//! Error types for the interception client.
//!
//! # Design
//! Every failure a dispatch can produce lands in `DispatchError`. Interceptors
//! return the same type, so an error raised by a nested `dispatch` inside an
//! interceptor keeps its original variant instead of being wrapped again.
//! HTTP status codes are never errors; only cancellation, interceptor and
//! transport failures are.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error carried by interceptor and transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `Client::dispatch`.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The transport observed an already-cancelled signal. Every blacklisted
    /// dispatch ends here.
    #[error("request cancelled")]
    Cancelled,

    /// A request, response or route interceptor failed.
    #[error("interceptor failed: {0}")]
    Interceptor(#[source] BoxError),

    /// The transport could not complete the round-trip (unreachable host,
    /// connection reset, malformed request).
    #[error("transport failed: {0}")]
    Transport(#[source] BoxError),
}

impl DispatchError {
    pub fn interceptor(err: impl Into<BoxError>) -> Self {
        DispatchError::Interceptor(err.into())
    }

    pub fn transport(err: impl Into<BoxError>) -> Self {
        DispatchError::Transport(err.into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, DispatchError::Cancelled)
    }
}

/// Errors returned while loading a `ClientConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid base url: {0}")]
    Url(#[from] url::ParseError),
}
