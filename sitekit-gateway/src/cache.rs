//! Process-lifetime response cache for idempotent reads.
//!
//! Keyed by request fingerprint (target URL + encoded form). Values are
//! cloned on the way in and on the way out, so callers never hold a
//! reference into the cache.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, Value>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for a request. `form` is already in sorted key order.
    pub fn fingerprint(url: &str, form: &[(String, String)]) -> String {
        let encoded = form
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{url}?{encoded}")
    }

    /// Deep copy of a cached response. A poisoned lock reads as a miss.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().ok()?.get(key).cloned()
    }

    pub fn insert(&self, key: String, value: &Value) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
