//! Cache of values that go stale after a number of game ticks.

use fnv::FnvHashMap;
use std::hash::Hash;

#[derive(Clone, Debug)]
struct CacheEntry<V> {
    value: V,
    timestamp: u32,
}

#[derive(Clone, Debug)]
pub struct TimedCache<K: Eq + Hash, V> {
    entries: FnvHashMap<K, CacheEntry<V>>,
    ttl: u32,
}

impl<K: Eq + Hash, V> TimedCache<K, V> {
    pub fn new(ttl: u32) -> Self {
        TimedCache {
            entries: FnvHashMap::default(),
            ttl,
        }
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Returns the value if it was stored less than `ttl` ticks before `now`.
    pub fn get(&self, key: &K, now: u32) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|entry| now.saturating_sub(entry.timestamp) < self.ttl)
            .map(|entry| &entry.value)
    }

    pub fn insert(&mut self, key: K, value: V, now: u32) {
        self.entries.insert(key, CacheEntry { value, timestamp: now });
    }

    pub fn invalidate(&mut self, key: &K) {
        self.entries.remove(key);
    }

    /// Drop every entry that has expired.
    pub fn evict_expired(&mut self, now: u32) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| now.saturating_sub(entry.timestamp) < ttl);
    }
}
