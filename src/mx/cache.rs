use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

#[derive(Debug)]
struct CacheEntry {
    has_mx: bool,
    inserted_at: Instant,
    last_used: AtomicU64,
}

/// Domain -> "has MX" memo shared by every validation call.
///
/// Bounded by `capacity`; when full, the least recently used tenth is evicted
/// in one batch. Concurrent misses on the same domain may both insert, the
/// last write wins and both carry the same answer.
#[derive(Debug)]
pub(crate) struct MxCache {
    entries: DashMap<String, CacheEntry>,
    capacity: usize,
    ttl: Option<Duration>,
    clock: AtomicU64,
}

impl MxCache {
    pub(crate) fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
            ttl,
            clock: AtomicU64::new(0),
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<bool> {
        let tick = self.tick();
        {
            let entry = self.entries.get(key)?;
            if !self.is_expired(&entry) {
                entry.last_used.store(tick, Ordering::Relaxed);
                return Some(entry.has_mx);
            }
        }
        // the read guard must be gone before removing
        self.entries.remove(key);
        debug!(domain = key, "expired MX cache entry dropped");
        None
    }

    pub(crate) fn insert(&self, key: String, has_mx: bool) {
        if self.capacity == 0 {
            return;
        }
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict();
        }
        let entry = CacheEntry {
            has_mx,
            inserted_at: Instant::now(),
            last_used: AtomicU64::new(self.tick()),
        };
        self.entries.insert(key, entry);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&self) {
        self.entries.clear();
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl)
    }

    fn evict(&self) {
        let batch = (self.capacity / 10).max(1);
        let mut by_age: Vec<(u64, String)> = self
            .entries
            .iter()
            .map(|e| (e.last_used.load(Ordering::Relaxed), e.key().clone()))
            .collect();
        by_age.sort_unstable();
        for (_, key) in by_age.into_iter().take(batch) {
            self.entries.remove(&key);
        }
        debug!(
            evicted = batch,
            remaining = self.entries.len(),
            "MX cache full, evicted least recently used entries"
        );
    }
}
