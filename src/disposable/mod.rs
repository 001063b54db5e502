//! Disposable-domain classification backed by a remote blocklist.
//!
//! [`DisposableDomains`] holds an immutable snapshot behind an `Arc`. Readers
//! clone the `Arc` and test membership without holding the lock; a refresh
//! builds a new set and swaps the pointer, so no reader ever sees a partial
//! list.

mod error;
mod source;

pub use error::DisposableError;
pub use source::{DomainListSource, FileListSource, HttpListSource, StaticListSource};

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

type Snapshot = Arc<HashSet<String>>;

pub struct DisposableDomains {
    source: Box<dyn DomainListSource>,
    snapshot: RwLock<Snapshot>,
    loaded: AtomicBool,
    // serialises loads; holds the time of the last failed lazy attempt
    last_failure: Mutex<Option<Instant>>,
    retry_interval: Duration,
}

impl DisposableDomains {
    /// Empty, unloaded cache. The first classification triggers one load.
    pub fn new(source: impl DomainListSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            snapshot: RwLock::new(Arc::new(HashSet::new())),
            loaded: AtomicBool::new(false),
            last_failure: Mutex::new(None),
            retry_interval: Duration::ZERO,
        }
    }

    /// Minimum delay between two lazy load attempts once one has failed.
    /// [`refresh`](Self::refresh) ignores it.
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Case-insensitive membership test, ignoring a trailing root dot. Loads the list first if it never
    /// loaded successfully.
    pub fn is_disposable(&self, domain: &str) -> bool {
        if !self.is_loaded() {
            self.lazy_load();
        }
        let key = domain_key(domain);
        let hit = self.current().contains(&key);
        if hit {
            debug!(domain = %key, "disposable domain match");
        }
        hit
    }

    /// Fetches the list again and replaces the whole set. On failure the
    /// previous snapshot stays in place and the error is only logged.
    pub fn refresh(&self) {
        let mut last_failure = self
            .last_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.load() {
            *last_failure = None;
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.current().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current().is_empty()
    }

    fn current(&self) -> Snapshot {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn lazy_load(&self) {
        let mut last_failure = self
            .last_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // another caller may have loaded while we waited
        if self.is_loaded() {
            return;
        }
        if let Some(at) = *last_failure {
            if at.elapsed() < self.retry_interval {
                return;
            }
        }
        *last_failure = if self.load() {
            None
        } else {
            Some(Instant::now())
        };
    }

    fn load(&self) -> bool {
        match self.source.fetch() {
            Ok(domains) => {
                let set: HashSet<String> = domains
                    .iter()
                    .map(|d| domain_key(d))
                    .filter(|d| !d.is_empty())
                    .collect();
                let count = set.len();
                *self
                    .snapshot
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = Arc::new(set);
                self.loaded.store(true, Ordering::Release);
                info!(
                    source = %self.source.describe(),
                    count,
                    "disposable domain list loaded"
                );
                true
            }
            Err(err) => {
                warn!(
                    source = %self.source.describe(),
                    error = %err,
                    "could not load disposable domain list, keeping previous snapshot"
                );
                false
            }
        }
    }
}

/// Lower-case, trimmed, without the root dot.
fn domain_key(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_lowercase()
}

impl std::fmt::Debug for DisposableDomains {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisposableDomains")
            .field("source", &self.source.describe())
            .field("loaded", &self.is_loaded())
            .field("len", &self.len())
            .finish()
    }
}
