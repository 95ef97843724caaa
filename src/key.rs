//! Request key generation and per-call-site key memoization.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use uuid::Uuid;

/// Source of fresh request keys.
pub trait KeyGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random v4 UUID keys. The default generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidKeys;

impl KeyGenerator for UuidKeys {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `prefix-1`, `prefix-2`, ... keys.
#[derive(Debug, Default)]
pub struct SequentialKeys {
    prefix: String,
    next: AtomicU64,
}

impl SequentialKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl KeyGenerator for SequentialKeys {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}

/// The request key of one call site.
///
/// A generated key is created lazily on first use and reused until the
/// dependency list changes. A fixed key never changes.
///
/// ```
/// use serde_json::json;
/// use superbia_store::{RequestKey, SequentialKeys};
///
/// let keys = SequentialKeys::new("req");
/// let mut slot = RequestKey::new();
///
/// let first = slot.get(&[json!("user-1")], &keys).to_string();
/// assert_eq!(slot.get(&[json!("user-1")], &keys), first);
/// assert_ne!(slot.get(&[json!("user-2")], &keys), first);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestKey {
    fixed: bool,
    key: Option<String>,
    deps: Option<Vec<Value>>,
}

impl RequestKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fixed(key: impl Into<String>) -> Self {
        Self {
            fixed: true,
            key: Some(key.into()),
            deps: None,
        }
    }

    pub fn get(&mut self, deps: &[Value], generator: &dyn KeyGenerator) -> &str {
        if !self.fixed {
            let stale = self.deps.as_deref() != Some(deps);
            if stale || self.key.is_none() {
                self.key = Some(generator.generate());
                self.deps = Some(deps.to_vec());
            }
        }
        self.key.get_or_insert_with(|| generator.generate())
    }

    /// The current key, if one has been produced.
    pub fn current(&self) -> Option<&str> {
        self.key.as_deref()
    }
}
