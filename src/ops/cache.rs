use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::model::config::CacheConfig;
use crate::model::filter::FilterCriteria;
use crate::model::task::TaskRecord;
use crate::ops::filter::filter_tasks;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of timestamps for cache entries
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock backed by `Instant::now`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            base: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Counters for cache behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped by the capacity sweep
    pub evictions: u64,
    /// Entries dropped for exceeding the TTL
    pub expirations: u64,
    /// Entries dropped by explicit invalidation
    pub invalidations: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    tasks: Arc<[TaskRecord]>,
    written_at: Instant,
    /// Insertion order, breaks ties between equal timestamps
    seq: u64,
}

/// Filtered views keyed by `FilterCriteria::cache_key`, bounded by age and count.
///
/// An entry is never served once `ttl` has elapsed since it was written, and
/// the number of live entries never exceeds `max_entries`; when it would, the
/// oldest writes are evicted first.
#[derive(Debug)]
pub struct ResultCache<C: Clock = SystemClock> {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
    max_entries: usize,
    clock: C,
    next_seq: u64,
    stats: CacheStats,
}

impl ResultCache<SystemClock> {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> ResultCache<C> {
    pub fn with_clock(config: &CacheConfig, clock: C) -> Self {
        ResultCache {
            entries: HashMap::new(),
            ttl: config.ttl(),
            // A zero bound would evict every insert before it could be read
            max_entries: config.max_entries.max(1),
            clock,
            next_seq: 0,
            stats: CacheStats::default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Whether a fresh entry exists for `key` (no stats recorded)
    pub fn contains(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.entries
            .get(key)
            .is_some_and(|e| now.saturating_duration_since(e.written_at) < self.ttl)
    }

    /// Whether an entry is stored under `key`, fresh or not
    pub fn has_entry(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Return the cached view for `criteria`, computing and storing it on a miss.
    pub fn get_or_compute(
        &mut self,
        tasks: &[TaskRecord],
        criteria: &FilterCriteria,
    ) -> Arc<[TaskRecord]> {
        let key = criteria.cache_key();
        if let Some(hit) = self.get(&key) {
            return hit;
        }
        let computed: Arc<[TaskRecord]> = filter_tasks(tasks, criteria).into();
        self.insert(key, Arc::clone(&computed));
        computed
    }

    /// Look up a fresh entry. A stale entry is removed and reported as a miss.
    pub fn get(&mut self, key: &str) -> Option<Arc<[TaskRecord]>> {
        let now = self.clock.now();
        let fresh = match self.entries.get(key) {
            Some(entry) => now.saturating_duration_since(entry.written_at) < self.ttl,
            None => {
                self.stats.misses += 1;
                debug!(key, "cache miss");
                return None;
            }
        };
        if fresh {
            self.stats.hits += 1;
            debug!(key, "cache hit");
            return self.entries.get(key).map(|e| Arc::clone(&e.tasks));
        }
        self.entries.remove(key);
        self.stats.expirations += 1;
        self.stats.misses += 1;
        debug!(key, "cache entry expired");
        None
    }

    /// Store a view under `key`, then purge expired entries and enforce capacity.
    pub fn insert(&mut self, key: String, tasks: Arc<[TaskRecord]>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let written_at = self.clock.now();
        debug!(key = key.as_str(), len = tasks.len(), "cache store");
        self.entries.insert(
            key,
            CacheEntry {
                tasks,
                written_at,
                seq,
            },
        );
        self.cleanup();
        self.enforce_capacity();
    }

    /// Remove every entry older than the TTL. Returns how many were removed.
    pub fn cleanup(&mut self) -> usize {
        let now = self.clock.now();
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries
            .retain(|_, e| now.saturating_duration_since(e.written_at) < ttl);
        let removed = before - self.entries.len();
        if removed > 0 {
            self.stats.expirations += removed as u64;
            debug!(removed, "purged expired cache entries");
        }
        removed
    }

    fn enforce_capacity(&mut self) {
        if self.entries.len() <= self.max_entries {
            return;
        }
        let excess = self.entries.len() - self.max_entries;
        let mut by_age: Vec<(Instant, u64, String)> = self
            .entries
            .iter()
            .map(|(k, e)| (e.written_at, e.seq, k.clone()))
            .collect();
        by_age.sort();
        for (_, _, key) in by_age.into_iter().take(excess) {
            self.entries.remove(&key);
            self.stats.evictions += 1;
            debug!(key = key.as_str(), "evicted cache entry");
        }
    }

    /// Drop one entry. Returns whether it existed.
    pub fn invalidate(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.stats.invalidations += 1;
            debug!(key, "invalidated cache entry");
        }
        removed
    }

    /// Drop every entry. Returns how many were removed.
    pub fn invalidate_all(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.stats.invalidations += removed as u64;
        debug!(removed, "invalidated cache");
        removed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
