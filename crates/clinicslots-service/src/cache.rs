//! Slot cache with TTL (Time-To-Live) support.
//!
//! This module provides a short-lived cache of live provider responses so
//! repeated queries for the same schedulers and window do not each hit the
//! provider. Fixture data is never cached.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use clinicslots_providers::{FreeTimeRequest, RawSlot};
use tracing::{debug, trace};

/// Identifies one upstream free-time query.
///
/// The auth token is deliberately not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub scheduler_ids: Vec<i64>,
    pub duration_minutes: u32,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl FetchKey {
    /// Builds the key for a request.
    pub fn for_request(request: &FreeTimeRequest) -> Self {
        Self {
            scheduler_ids: request.scheduler_ids.clone(),
            duration_minutes: request.duration_minutes,
            from: request.window.start,
            to: request.window.end,
        }
    }
}

/// Cache entry containing raw slots and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Cached provider slots.
    pub slots: Vec<RawSlot>,
    /// When the slots were fetched.
    pub fetched_at: DateTime<Utc>,
    /// When the entry expires (monotonic clock).
    expires_at: Instant,
}

impl CacheEntry {
    /// Creates a new cache entry with the given TTL.
    pub fn new(slots: Vec<RawSlot>, ttl: Duration) -> Self {
        Self {
            slots,
            fetched_at: Utc::now(),
            expires_at: Instant::now() + ttl,
        }
    }

    /// Returns true if the entry has expired.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Returns how long ago the slots were fetched.
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.fetched_at
    }
}

/// Slot cache with TTL support.
///
/// A zero TTL disables the cache: nothing is stored and every lookup misses.
#[derive(Debug)]
pub struct SlotCache {
    /// TTL for new entries.
    ttl: Duration,
    entries: HashMap<FetchKey, CacheEntry>,
}

impl SlotCache {
    /// Creates a new cache with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Returns true if entries are stored at all.
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Gets the slots for a key, only if not expired.
    pub fn get_valid(&self, key: &FetchKey) -> Option<&CacheEntry> {
        self.entries.get(key).filter(|entry| !entry.is_expired())
    }

    /// Inserts or replaces an entry.
    pub fn insert(&mut self, key: FetchKey, slots: Vec<RawSlot>) {
        if !self.is_enabled() {
            return;
        }
        trace!(schedulers = ?key.scheduler_ids, count = slots.len(), "caching slots");
        self.entries.insert(key, CacheEntry::new(slots, self.ttl));
    }

    /// Removes all expired entries.
    pub fn evict_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!(evicted = evicted, "Evicted expired cache entries");
        }
        evicted
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
