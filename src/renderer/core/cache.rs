//! Resource Cache
//!
//! Keyed cache for GPU-side resources (pipelines, meshes, textures). Entries
//! flagged persistent survive pruning; everything else is evicted after going
//! unused for a configurable number of frames.

use std::hash::Hash;

use rustc_hash::FxHashMap;

struct Entry<V> {
    value: V,
    persistent: bool,
    last_used: u64,
}

/// A keyed resource cache with per-entry persistence.
pub struct ResourceCache<K, V> {
    entries: FxHashMap<K, Entry<V>>,
    frame: u64,
}

impl<K: Hash + Eq, V> ResourceCache<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
            frame: 0,
        }
    }

    /// Advances the frame counter used for idle tracking.
    pub fn tick(&mut self) {
        self.frame += 1;
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Looks up `key` without touching its idle timer. Useful while the
    /// cache is borrowed shared, e.g. during an open render pass.
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Looks up `key`, refreshing its idle timer on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let frame = self.frame;
        self.entries.get_mut(key).map(|entry| {
            entry.last_used = frame;
            &entry.value
        })
    }

    /// Returns the cached value for `key`, creating it on a miss.
    pub fn get_or_create(&mut self, key: K, create: impl FnOnce() -> V) -> &V {
        self.insert_with(key, false, create)
    }

    /// Like [`get_or_create`](Self::get_or_create), but the entry is never
    /// pruned. An existing entry is promoted to persistent.
    pub fn get_or_create_persistent(&mut self, key: K, create: impl FnOnce() -> V) -> &V {
        self.insert_with(key, true, create)
    }

    fn insert_with(&mut self, key: K, persistent: bool, create: impl FnOnce() -> V) -> &V {
        let frame = self.frame;
        let entry = self.entries.entry(key).or_insert_with(|| Entry {
            value: create(),
            persistent,
            last_used: frame,
        });
        entry.last_used = frame;
        entry.persistent |= persistent;
        &entry.value
    }

    /// Evicts non-persistent entries unused for more than `max_idle_frames`.
    pub fn prune(&mut self, max_idle_frames: u64) {
        let frame = self.frame;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.persistent || frame - entry.last_used <= max_idle_frames);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            log::debug!("resource cache evicted {evicted} entries");
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Hash + Eq, V> Default for ResourceCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_once_per_key() {
        let mut cache = ResourceCache::new();
        let mut calls = 0;
        cache.get_or_create("a", || {
            calls += 1;
            1
        });
        cache.get_or_create("a", || {
            calls += 1;
            2
        });
        assert_eq!(calls, 1);
        assert_eq!(cache.get(&"a"), Some(&1));
    }

    #[test]
    fn prune_spares_persistent_and_recently_used() {
        let mut cache = ResourceCache::new();
        cache.get_or_create_persistent("keep", || 0);
        cache.get_or_create("stale", || 1);
        for _ in 0..10 {
            cache.tick();
        }
        cache.get_or_create("fresh", || 2);
        cache.prune(5);
        assert!(cache.contains(&"keep"));
        assert!(cache.contains(&"fresh"));
        assert!(!cache.contains(&"stale"));
    }

    #[test]
    fn hit_refreshes_idle_timer() {
        let mut cache = ResourceCache::new();
        cache.get_or_create("a", || 0);
        for _ in 0..4 {
            cache.tick();
            cache.get(&"a");
        }
        cache.tick();
        cache.prune(2);
        assert!(cache.contains(&"a"));
    }
}
