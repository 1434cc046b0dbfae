//! Blacklist gate.
//!
//! Membership is tested against the target as dispatched and against its
//! resolved string, as two independent entries. A relative path and the
//! equivalent absolute URL are both blocked only when both are registered.
//!
//! Entries compare by value. A `Url` entry matches an equal `Url` target, and
//! an `HttpRequest` entry matches any request equal in url, method, headers
//! and body, not only the instance that was registered.

use std::collections::HashSet;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::http::CancelSignal;
use crate::target::RequestTarget;

/// Set of blocked targets. `HttpRequest` entries are keyed by value, so an
/// equal request built elsewhere is the same entry.
#[derive(Debug, Default)]
pub struct Blacklist {
    entries: RwLock<HashSet<RequestTarget>>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the entry was already present.
    pub fn add(&self, target: impl Into<RequestTarget>) -> bool {
        self.entries.write().insert(target.into())
    }

    pub fn delete(&self, target: impl Into<RequestTarget>) -> bool {
        self.entries.write().remove(&target.into())
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn contains(&self, target: &RequestTarget) -> bool {
        self.entries.read().contains(target)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// True if either the raw target or its resolved string is registered.
    pub fn is_blocked(&self, target: &RequestTarget, resolved: &str) -> bool {
        let entries = self.entries.read();
        if entries.is_empty() {
            return false;
        }
        entries.contains(target) || entries.contains(&RequestTarget::Str(resolved.to_string()))
    }
}

/// A signal that is already cancelled. Built once per client and attached to
/// every blocked dispatch.
pub(crate) fn aborted_signal() -> CancelSignal {
    let token = CancellationToken::new();
    token.cancel();
    token
}
