//! Structure Cache
//!
//! Bounded in-memory cache with per-entry time-to-live and least-recently-used
//! eviction. Every operation takes the same lock, so each one is atomic with
//! respect to the others and no caller can observe a half-updated ordering.
//!
//! Expiry is lazy: nothing sweeps in the background. `get`/`contains` drop
//! the entry they find expired, `size` prunes all expired entries first.

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::config::CacheConfig;
use crate::error::{PdbContextError, PdbContextResult};

/// Longest accepted time-to-live (100 years). Keeps `now + ttl` well inside
/// the range of `Instant` for the lifetime of the process.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Source of the current time for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Monotonic wall clock used outside of tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

#[derive(Default)]
struct Counters {
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
}

struct CacheState<V> {
    // Front is least recently used, back is most recently used.
    entries: IndexMap<String, CacheEntry<V>>,
    counters: Counters,
}

/// Point-in-time view of cache occupancy and counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub enabled: bool,
    pub entries: usize,
    pub max_size: usize,
    pub ttl_seconds: f64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

/// Thread-safe LRU cache with a fixed TTL.
///
/// Values are returned by clone; store an `Arc` when values are large.
pub struct LruTtlCache<V> {
    state: Mutex<CacheState<V>>,
    max_size: usize,
    ttl: Duration,
    enabled: bool,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> LruTtlCache<V> {
    /// Creates an enabled cache. Fails if `max_size` is zero or `ttl` is zero.
    pub fn new(max_size: usize, ttl: Duration) -> PdbContextResult<Self> {
        Self::with_clock(max_size, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(
        max_size: usize,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> PdbContextResult<Self> {
        if max_size == 0 {
            return Err(PdbContextError::configuration(
                "max_size must be a positive integer",
            ));
        }
        if ttl.is_zero() {
            return Err(PdbContextError::configuration(
                "ttl_seconds must be a positive number",
            ));
        }
        if ttl > MAX_TTL || clock.now().checked_add(ttl).is_none() {
            return Err(PdbContextError::configuration(format!(
                "ttl_seconds must not exceed {}, got {}",
                MAX_TTL.as_secs(),
                ttl.as_secs_f64()
            )));
        }

        Ok(Self {
            state: Mutex::new(CacheState {
                entries: IndexMap::with_capacity(max_size.min(1024)),
                counters: Counters::default(),
            }),
            max_size,
            ttl,
            enabled: true,
            clock,
        })
    }

    /// Builds a cache from configuration, applying the enabled flag.
    pub fn from_config(config: &CacheConfig) -> PdbContextResult<Self> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(
        config: &CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> PdbContextResult<Self> {
        if config.max_size <= 0 {
            return Err(PdbContextError::configuration(format!(
                "max_size must be a positive integer, got {}",
                config.max_size
            )));
        }
        if !config.ttl_seconds.is_finite() || config.ttl_seconds <= 0.0 {
            return Err(PdbContextError::configuration(format!(
                "ttl_seconds must be a positive number, got {}",
                config.ttl_seconds
            )));
        }

        let max_size = usize::try_from(config.max_size).map_err(|_| {
            PdbContextError::configuration(format!("max_size {} is too large", config.max_size))
        })?;
        let ttl = Duration::try_from_secs_f64(config.ttl_seconds).map_err(|e| {
            PdbContextError::configuration(format!("ttl_seconds {}: {}", config.ttl_seconds, e))
        })?;

        Ok(Self::with_clock(max_size, ttl, clock)?.with_enabled(config.enabled))
    }

    /// Switches the cache on or off. A disabled cache misses every `get` and
    /// ignores `set` and `delete`.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the live value for `key` and marks it most recently used.
    /// The entry's expiry is not extended.
    pub fn get(&self, key: &str) -> Option<V> {
        if !self.enabled {
            return None;
        }

        let now = self.clock.now();
        let mut state = self.state.lock();

        let expired = match state.entries.get(key) {
            None => {
                state.counters.misses += 1;
                return None;
            }
            Some(entry) => entry.is_expired(now),
        };

        if expired {
            state.entries.shift_remove(key);
            state.counters.expirations += 1;
            state.counters.misses += 1;
            return None;
        }

        let index = state.entries.get_index_of(key)?;
        let last = state.entries.len() - 1;
        state.entries.move_index(index, last);
        state.counters.hits += 1;

        state.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Stores `value` with a fresh expiry, replacing any existing entry and
    /// evicting the least recently used entry if a new key would overflow.
    pub fn set(&self, key: impl Into<String>, value: V) {
        if !self.enabled {
            return;
        }

        let key = key.into();
        let Some(expires_at) = self.clock.now().checked_add(self.ttl) else {
            warn!(key = %key, "Expiry out of range, entry not stored");
            return;
        };
        let mut state = self.state.lock();

        if state.entries.shift_remove(&key).is_none() && state.entries.len() >= self.max_size {
            state.entries.shift_remove_index(0);
            state.counters.evictions += 1;
        }

        state.entries.insert(key, CacheEntry { value, expires_at });
    }

    pub fn delete(&self, key: &str) {
        if !self.enabled {
            return;
        }

        self.state.lock().entries.shift_remove(key);
    }

    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }

    /// Number of live entries. Expired entries are pruned first.
    pub fn size(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.state.lock();
        Self::prune_expired(&mut state, now);
        state.entries.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let mut state = self.state.lock();
        Self::prune_expired(&mut state, now);

        CacheStats {
            enabled: self.enabled,
            entries: state.entries.len(),
            max_size: self.max_size,
            ttl_seconds: self.ttl.as_secs_f64(),
            hits: state.counters.hits,
            misses: state.counters.misses,
            evictions: state.counters.evictions,
            expirations: state.counters.expirations,
        }
    }

    fn prune_expired(state: &mut CacheState<V>, now: Instant) {
        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired(now));
        state.counters.expirations += (before - state.entries.len()) as u64;
    }
}
