//! Header sets and the default-header overlay.

use parking_lot::RwLock;

/// Ordered header mapping. Names are lower-cased on every entry point so
/// lookups are case-insensitive; `set` on an existing name keeps its slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut set = Self::new();
        for (name, value) in pairs {
            set.set(name.as_ref(), value);
        }
        set
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn delete(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// Fill `defaults` into a fresh copy of `caller`. Caller values always win;
/// a default is inserted only when the caller has no entry under its name.
pub fn overlay(caller: &HeaderSet, defaults: &HeaderSet) -> HeaderSet {
    let mut merged = caller.clone();
    for (name, value) in defaults.iter() {
        if !merged.has(name) {
            merged.set(name, value);
        }
    }
    merged
}

/// Process-wide default headers, shared with in-flight dispatches.
///
/// A dispatch copies the current set at its header-overlay stage, so a
/// mutation is visible to every call that has not reached that stage yet.
#[derive(Debug, Default)]
pub struct DefaultHeaders {
    inner: RwLock<HeaderSet>,
}

impl DefaultHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: &str, value: impl Into<String>) {
        self.inner.write().set(name, value);
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.inner.read().get(name).map(str::to_string)
    }

    pub fn delete(&self, name: &str) -> bool {
        self.inner.write().delete(name)
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Copy of the current defaults, in insertion order.
    pub fn snapshot(&self) -> HeaderSet {
        self.inner.read().clone()
    }

    /// Overlay the current defaults onto `caller`.
    pub fn apply(&self, caller: &HeaderSet) -> HeaderSet {
        overlay(caller, &self.inner.read())
    }
}
