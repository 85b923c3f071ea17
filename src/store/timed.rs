//! The concurrent timed store.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};

use super::entry::TimedEntry;

/// A concurrent map from string keys to values with per-entry TTLs.
///
/// Expiry is enforced lazily: a `get` on an expired entry behaves exactly
/// like a miss, regardless of whether the physical entry has been reclaimed
/// yet. [`sweep`](TimedStore::sweep) exists only to bound memory for keys
/// that are written once and never read again; correctness never depends on
/// it running.
///
/// This struct is thread-safe and can be shared across multiple tasks.
pub struct TimedStore<V> {
    /// Entries indexed by key
    entries: DashMap<String, TimedEntry<V>>,
    /// Time source for all expiry decisions
    clock: Arc<dyn Clock>,
}

impl<V> TimedStore<V> {
    /// Create a store driven by the process wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a store with an injected time source.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// The store's time source, shared with consumers that need to agree
    /// with it on what "now" means.
    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// Insert or replace the entry for `key`, expiring `ttl` from now.
    pub fn put(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let expires_at = self.clock.now() + ttl;
        self.entries
            .insert(key.into(), TimedEntry::new(value, expires_at));
    }

    /// Idempotent removal; absent keys are not an error.
    pub fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Physically remove every expired entry, returning how many were
    /// removed.
    ///
    /// Candidates are collected first and then removed one key at a time
    /// under a re-check, so an entry refreshed between the scan and the
    /// removal survives. Locking is per-shard; readers of other keys are
    /// not blocked for the duration of the pass.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.value().is_expired(now))
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed = 0;
        for key in expired {
            if self
                .entries
                .remove_if(&key, |_, entry| entry.is_expired(now))
                .is_some()
            {
                trace!(key = %key, "swept expired entry");
                removed += 1;
            }
        }

        if removed > 0 {
            debug!(removed, "sweep removed expired entries");
        }
        removed
    }

    /// Number of physical entries, expired or not. Primarily useful for
    /// diagnostics and tests.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no physical entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries.
    ///
    /// This is primarily useful for testing.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl<V: Clone> TimedStore<V> {
    /// Return the live value for `key`, or `None` if the key is absent or
    /// its entry has expired.
    ///
    /// An expired entry observed here is opportunistically removed; the
    /// removal re-checks expiry under the shard lock so a concurrent
    /// refresh of the same key is never lost.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let entry = self.entries.get(key)?;
        if entry.is_expired(now) {
            drop(entry);
            self.entries.remove_if(key, |_, e| e.is_expired(now));
            return None;
        }
        Some(entry.value.clone())
    }

    /// Atomic read-modify-write for `key` under the per-key entry lock.
    ///
    /// `f` receives the current live value (`None` if the key is absent or
    /// expired) and produces the new value, which is written back with a
    /// fresh expiry of `ttl` from now. Returns the value written. Two
    /// concurrent `update` calls on the same key are serialized, so no
    /// modification is lost.
    pub fn update<F>(&self, key: &str, ttl: Duration, f: F) -> V
    where
        F: FnOnce(Option<V>) -> V,
    {
        let now = self.clock.now();
        let expires_at = now + ttl;
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let current = if occupied.get().is_expired(now) {
                    None
                } else {
                    Some(occupied.get().value.clone())
                };
                let next = f(current);
                occupied.insert(TimedEntry::new(next.clone(), expires_at));
                next
            }
            Entry::Vacant(vacant) => {
                let next = f(None);
                vacant.insert(TimedEntry::new(next.clone(), expires_at));
                next
            }
        }
    }

    /// Insert only if `key` has no live entry, returning whether the
    /// insert happened. An expired entry counts as absent and is replaced.
    pub fn put_if_absent(&self, key: &str, value: V, ttl: Duration) -> bool {
        let now = self.clock.now();
        let expires_at = now + ttl;
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.insert(TimedEntry::new(value, expires_at));
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(TimedEntry::new(value, expires_at));
                true
            }
        }
    }
}

impl<V> Default for TimedStore<V> {
    fn default() -> Self {
        Self::new()
    }
}
