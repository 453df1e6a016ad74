//! Capacity-bounded LRU cache for foreign-key value reuse.
//!
//! Rows of referenced tables are cached under `(table, row number)` while
//! they are generated; columns referencing them look values up here.
//! The cache is shared by reference and synchronised internally.

use ahash::AHashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Capacity used when none (or a non-positive one) is configured
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Cache key: table name plus row identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub table: String,
    pub row: u64,
}

impl CacheKey {
    pub fn new(table: &str, row: u64) -> Self {
        Self {
            table: table.to_string(),
            row,
        }
    }
}

/// Counters reported by [`FkCache::stats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

struct Entry<V> {
    value: V,
    tick: u64,
}

struct LruState<V> {
    entries: AHashMap<CacheKey, Entry<V>>,
    /// recency tick → key; the smallest tick is the least recently used
    recency: BTreeMap<u64, CacheKey>,
    tick: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<V> LruState<V> {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn touch(&mut self, key: &CacheKey) {
        let tick = self.next_tick();
        if let Some(entry) = self.entries.get_mut(key) {
            self.recency.remove(&entry.tick);
            entry.tick = tick;
            self.recency.insert(tick, key.clone());
        }
    }

    fn evict_oldest(&mut self) {
        if let Some((_, key)) = self.recency.pop_first() {
            self.entries.remove(&key);
            self.evictions += 1;
        }
    }
}

/// Thread-safe LRU cache keyed by `(table, row)`
pub struct FkCache<V> {
    capacity: usize,
    state: Mutex<LruState<V>>,
}

impl<V: Clone> FkCache<V> {
    /// Create a cache holding at most `capacity` entries; zero or negative
    /// capacities fall back to [`DEFAULT_CACHE_CAPACITY`].
    pub fn new(capacity: i64) -> Self {
        let capacity = if capacity <= 0 {
            DEFAULT_CACHE_CAPACITY
        } else {
            capacity as usize
        };
        Self {
            capacity,
            state: Mutex::new(LruState {
                entries: AHashMap::with_capacity(capacity.min(DEFAULT_CACHE_CAPACITY)),
                recency: BTreeMap::new(),
                tick: 0,
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruState<V>> {
        // every update leaves both maps consistent, so poisoning is ignored
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up a value, refreshing its recency on a hit.
    pub fn get(&self, table: &str, row: u64) -> Option<V> {
        let key = CacheKey::new(table, row);
        let mut state = self.lock();
        let value = state.entries.get(&key).map(|e| e.value.clone());
        match value {
            Some(v) => {
                state.hits += 1;
                state.touch(&key);
                Some(v)
            }
            None => {
                state.misses += 1;
                None
            }
        }
    }

    /// Insert or replace a value. Inserting a new key into a full cache
    /// evicts the least recently used entry first.
    pub fn put(&self, table: &str, row: u64, value: V) {
        let key = CacheKey::new(table, row);
        let mut state = self.lock();

        if let Some(entry) = state.entries.get_mut(&key) {
            entry.value = value;
            state.touch(&key);
            return;
        }

        if state.entries.len() >= self.capacity {
            state.evict_oldest();
        }

        let tick = state.next_tick();
        state.recency.insert(tick, key.clone());
        state.entries.insert(key, Entry { value, tick });
    }

    /// Membership test that neither counts as a lookup nor refreshes recency.
    pub fn contains(&self, table: &str, row: u64) -> bool {
        self.lock().entries.contains_key(&CacheKey::new(table, row))
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all entries; statistics are kept.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.recency.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
            size: state.entries.len(),
            capacity: self.capacity,
        }
    }
}

impl<V: Clone> Default for FkCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY as i64)
    }
}
