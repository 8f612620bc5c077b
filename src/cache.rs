//! Bounded, time-expiring result cache.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Default maximum number of cached results.
pub const DEFAULT_CAPACITY: usize = 50;

/// Default lifetime of a cached result.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug)]
struct Entry {
    result: String,
    inserted: Instant,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    /// Keys in insertion order, oldest first.
    order: VecDeque<String>,
}

impl Inner {
    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            if let Some(pos) = self.order.iter().position(|k| k == key) {
                self.order.remove(pos);
            }
        }
    }
}

/// Memo of transform results keyed by operation prefix plus raw input.
///
/// Holds at most `capacity` entries. Entries older than `ttl` are treated as
/// absent and removed when looked up. On overflow the earliest *inserted*
/// entry is evicted; lookups do not refresh an entry's position, so this is
/// insertion-order eviction rather than LRU. Overwriting an existing key
/// keeps its original position.
///
/// The cache is internally synchronized and can be shared between threads.
#[derive(Debug)]
pub struct ResultCache {
    inner: Mutex<Inner>,
    capacity: usize,
    ttl: Duration,
}

impl ResultCache {
    /// Create a cache holding at most `capacity` results for `ttl` each.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity,
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Every mutation leaves the map and order queue consistent, so a
        // poisoned lock is still safe to use.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached result for `key`, unless absent or expired.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut inner = self.lock();
        let expired = match inner.entries.get(key) {
            None => return None,
            Some(entry) => entry.inserted.elapsed() > self.ttl,
        };
        if expired {
            tracing::debug!("Cache entry expired");
            inner.remove(key);
            return None;
        }
        inner.entries.get(key).map(|entry| entry.result.clone())
    }

    /// Stores `result` under `key`.
    ///
    /// When the cache is full the earliest-inserted entry is evicted first,
    /// even if `key` is already present.
    pub fn set(&self, key: impl Into<String>, result: impl Into<String>) {
        let key = key.into();
        let mut inner = self.lock();

        if inner.entries.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
                tracing::debug!("Cache full, evicted oldest entry");
            }
        }

        let entry = Entry {
            result: result.into(),
            inserted: Instant::now(),
        };
        if inner.entries.insert(key.clone(), entry).is_none() {
            inner.order.push_back(key);
        }
    }

    /// Removes every entry.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    /// Number of stored entries, expired ones included until looked up.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lifetime of each entry.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}
