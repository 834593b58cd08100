//! Lookup counters for a [`crate::localization::Localization`] service.
//!
//! Counters are atomics so lookups can record through `&self`.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct LookupMetrics {
    /// Found in the requested sheet (or any sheet for unscoped lookups)
    hits: AtomicUsize,

    /// Found only in the default sheet after the requested sheet missed
    fallback_hits: AtomicUsize,

    /// Not found anywhere; the missing-key marker was returned
    misses: AtomicUsize,
}

impl LookupMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback_hit(&self) {
        self.fallback_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn fallback_hits(&self) -> usize {
        self.fallback_hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn report(&self) -> MetricsReport {
        let hits = self.hits();
        let fallback_hits = self.fallback_hits();
        let misses = self.misses();
        let lookups = hits + fallback_hits + misses;
        let found_rate = if lookups > 0 {
            ((hits + fallback_hits) as f64 / lookups as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            lookups,
            hits,
            fallback_hits,
            misses,
            found_rate,
        }
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.fallback_hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

/// Snapshot of the lookup counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub lookups: usize,
    pub hits: usize,
    pub fallback_hits: usize,
    pub misses: usize,

    /// Share of lookups that found a value, as a percentage (0-100)
    pub found_rate: f64,
}
