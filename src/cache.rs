//! Keyed TTL cache for provider responses.
//!
//! The weather provider declares a one-hour TTL; entries older than the TTL
//! are evicted on read. An entry exactly TTL old is already stale.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// True while a cached value's age is strictly inside its TTL.
pub fn is_cache_valid(age: Duration, ttl: Duration) -> bool {
    age < ttl
}

/// Stable cache key from the parts identifying a request.
pub fn cache_key(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

struct Entry<T> {
    value: T,
    inserted_at: Instant,
}

pub struct TtlCache<T> {
    entries: Mutex<HashMap<String, Entry<T>>>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the cached value, evicting it first if it has expired.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(entry) if is_cache_valid(entry.inserted_at.elapsed(), self.ttl) => {
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: String, value: T) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key,
                Entry {
                    value,
                    inserted_at: Instant::now(),
                },
            );
        }
    }
}
