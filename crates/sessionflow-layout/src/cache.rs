//! Memoization of flow layouts.
//!
//! [`compute_flow_layout`] is pure, so a dashboard that re-renders on every
//! refresh can skip the work whenever the event batch and config are
//! unchanged. [`FlowLayoutCache`] keys results by a fingerprint of both.
//!
//! # Usage
//!
//! ```
//! use sessionflow_layout::{Event, FlowLayoutCache, LayoutConfig};
//!
//! let mut cache = FlowLayoutCache::new(16);
//! let config = LayoutConfig::default();
//! let events = vec![
//!     Event::new("session_start", "s1", 0),
//!     Event::new("page_view", "s1", 10),
//! ];
//!
//! let first = cache.layout(&events, &config);
//! let second = cache.layout(&events, &config);
//! assert_eq!(first, second);
//! assert_eq!(cache.stats().hits, 1);
//! ```
//!
//! # Invalidation
//!
//! The batch contents are part of the key, so new events never hit a stale
//! entry. [`FlowLayoutCache::invalidate_all()`] marks every entry stale in
//! O(1) for callers that want to force recomputation.
//!
//! # Eviction
//!
//! When full, the entry with the fewest accesses is evicted.

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};

use crate::config::LayoutConfig;
use crate::engine::compute_flow_layout;
use crate::event::Event;
use crate::layout::FlowOutcome;

/// Key for layout cache lookups.
///
/// Events are fingerprinted in input order: the same multiset in a
/// different order gets a different key even though partitioning would
/// produce the same sequences for most batches.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FlowLayoutKey {
    /// Number of events in the batch.
    pub event_count: usize,
    /// Hash fingerprint of the events.
    pub events_hash: u64,
    /// Hash fingerprint of the layout config.
    pub config_hash: u64,
}

impl FlowLayoutKey {
    /// Create a key from a batch and config.
    pub fn new(events: &[Event], config: &LayoutConfig) -> Self {
        Self {
            event_count: events.len(),
            events_hash: Self::hash_events(events),
            config_hash: Self::hash_config(config),
        }
    }

    fn hash_events(events: &[Event]) -> u64 {
        let mut hasher = FxHasher::default();
        events.hash(&mut hasher);
        hasher.finish()
    }

    fn hash_config(config: &LayoutConfig) -> u64 {
        let mut hasher = FxHasher::default();
        for value in [
            config.canvas_height,
            config.top_bottom_padding,
            config.inter_node_gap,
            config.min_node_height,
            config.min_link_width,
        ] {
            value.to_bits().hash(&mut hasher);
        }
        config.level_bounds.hash(&mut hasher);
        config.start_type.hash(&mut hasher);
        config.end_type.hash(&mut hasher);
        config.palette.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug)]
struct CachedFlowEntry {
    outcome: FlowOutcome,
    generation: u64,
    access_count: u32,
}

/// Statistics about layout cache performance.
#[derive(Debug, Clone, Default)]
pub struct FlowLayoutCacheStats {
    /// Number of entries currently in the cache.
    pub entries: usize,
    /// Total cache hits since creation or last reset.
    pub hits: u64,
    /// Total cache misses since creation or last reset.
    pub misses: u64,
    /// Hit rate as a fraction (0.0 to 1.0).
    pub hit_rate: f64,
}

/// Cache for flow layout results.
#[derive(Debug)]
pub struct FlowLayoutCache {
    entries: FxHashMap<FlowLayoutKey, CachedFlowEntry>,
    generation: u64,
    max_entries: usize,
    hits: u64,
    misses: u64,
}

impl FlowLayoutCache {
    /// Create a new cache holding at most `max_entries` results.
    ///
    /// A capacity of 0 is treated as 1.
    #[inline]
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: FxHashMap::with_capacity_and_hasher(max_entries, Default::default()),
            generation: 0,
            max_entries,
            hits: 0,
            misses: 0,
        }
    }

    /// Layout for `events` under `config`, computed at most once per key.
    pub fn layout(&mut self, events: &[Event], config: &LayoutConfig) -> FlowOutcome {
        let key = FlowLayoutKey::new(events, config);
        self.get_or_compute(key, || compute_flow_layout(events, config))
    }

    /// Get a cached outcome or compute and cache a new one.
    pub fn get_or_compute<F>(&mut self, key: FlowLayoutKey, compute: F) -> FlowOutcome
    where
        F: FnOnce() -> FlowOutcome,
    {
        if let Some(entry) = self.entries.get_mut(&key)
            && entry.generation == self.generation
        {
            self.hits += 1;
            entry.access_count = entry.access_count.saturating_add(1);
            return entry.outcome.clone();
        }

        self.misses += 1;
        let outcome = compute();

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict_least_accessed();
        }

        self.entries.insert(
            key,
            CachedFlowEntry {
                outcome: outcome.clone(),
                generation: self.generation,
                access_count: 1,
            },
        );
        tracing::trace!(entries = self.entries.len(), "flow layout cached");

        outcome
    }

    /// Invalidate all entries by bumping the generation.
    #[inline]
    pub fn invalidate_all(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Get current cache statistics.
    pub fn stats(&self) -> FlowLayoutCacheStats {
        let total = self.hits + self.misses;
        FlowLayoutCacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
            hit_rate: if total > 0 {
                self.hits as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    /// Reset statistics counters to zero.
    #[inline]
    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    /// Remove every entry, freeing memory immediately.
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    fn evict_least_accessed(&mut self) {
        if let Some(key) = self
            .entries
            .iter()
            .min_by_key(|(_, e)| (e.generation == self.generation, e.access_count))
            .map(|(k, _)| *k)
        {
            self.entries.remove(&key);
        }
    }
}

impl Default for FlowLayoutCache {
    /// Creates a cache with default capacity of 32 entries.
    fn default() -> Self {
        Self::new(32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(session: &str) -> Vec<Event> {
        vec![
            Event::new("session_start", session, 0),
            Event::new("page_view", session, 10),
            Event::new("session_end", session, 20),
        ]
    }

    #[test]
    fn same_inputs_hit() {
        let mut cache = FlowLayoutCache::new(4);
        let config = LayoutConfig::default();
        let events = batch("s1");

        let mut calls = 0;
        let key = FlowLayoutKey::new(&events, &config);
        let first = cache.get_or_compute(key, || {
            calls += 1;
            compute_flow_layout(&events, &config)
        });
        let second = cache.get_or_compute(key, || {
            calls += 1;
            compute_flow_layout(&events, &config)
        });

        assert_eq!(calls, 1);
        assert_eq!(first, second);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
        assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn different_batches_get_different_keys() {
        let config = LayoutConfig::default();
        assert_ne!(
            FlowLayoutKey::new(&batch("s1"), &config),
            FlowLayoutKey::new(&batch("s2"), &config)
        );
    }

    #[test]
    fn config_changes_miss() {
        let events = batch("s1");
        let a = FlowLayoutKey::new(&events, &LayoutConfig::default());
        let b = FlowLayoutKey::new(&events, &LayoutConfig::default().inter_node_gap(1.0));
        let c = FlowLayoutKey::new(&events, &LayoutConfig::default().end_type(None));
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn invalidate_all_forces_recompute() {
        let mut cache = FlowLayoutCache::new(4);
        let config = LayoutConfig::default();
        let events = batch("s1");
        cache.layout(&events, &config);
        cache.invalidate_all();
        cache.layout(&events, &config);
        assert_eq!(cache.stats().misses, 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn capacity_is_respected() {
        let mut cache = FlowLayoutCache::new(2);
        let config = LayoutConfig::default();
        for session in ["a", "b", "c", "d"] {
            cache.layout(&batch(session), &config);
        }
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.capacity(), 2);
    }

    #[test]
    fn frequently_used_entry_survives_eviction() {
        let mut cache = FlowLayoutCache::new(2);
        let config = LayoutConfig::default();
        let hot = batch("hot");
        for _ in 0..3 {
            cache.layout(&hot, &config);
        }
        cache.layout(&batch("cold1"), &config);
        cache.layout(&batch("cold2"), &config);
        cache.reset_stats();
        cache.layout(&hot, &config);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn clear_empties_cache() {
        let mut cache = FlowLayoutCache::default();
        cache.layout(&batch("s1"), &LayoutConfig::default());
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn insufficient_outcomes_are_cached_too() {
        let mut cache = FlowLayoutCache::new(2);
        let config = LayoutConfig::default();
        assert!(cache.layout(&[], &config).is_insufficient());
        assert!(cache.layout(&[], &config).is_insufficient());
        assert_eq!(cache.stats().hits, 1);
    }
}
