//! Query Metrics
//!
//! Per-route counters and latency tracking for the similarity server.

use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector
#[derive(Debug)]
pub struct Metrics {
    /// Total queries answered
    total_ops: AtomicU64,

    /// Queries that returned an error
    failed_ops: AtomicU64,

    /// Queries per route
    ops_by_route: RwLock<HashMap<String, u64>>,

    /// Latency tracking
    latency_sum_us: AtomicU64,
    latency_min_us: AtomicU64,
    latency_max_us: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self {
            total_ops: AtomicU64::new(0),
            failed_ops: AtomicU64::new(0),
            ops_by_route: RwLock::new(HashMap::new()),
            latency_sum_us: AtomicU64::new(0),
            latency_min_us: AtomicU64::new(u64::MAX),
            latency_max_us: AtomicU64::new(0),
        }
    }

    /// Record one answered query
    pub fn record(&self, route: &str, latency: Duration, ok: bool) {
        // Increment totals
        self.total_ops.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.failed_ops.fetch_add(1, Ordering::Relaxed);
        }

        // Increment per-route counter
        *self
            .ops_by_route
            .write()
            .entry(route.to_string())
            .or_insert(0) += 1;

        // Record latency
        let latency_us = latency.as_micros() as u64;
        self.latency_sum_us.fetch_add(latency_us, Ordering::Relaxed);
        self.latency_min_us.fetch_min(latency_us, Ordering::Relaxed);
        self.latency_max_us.fetch_max(latency_us, Ordering::Relaxed);
    }

    /// Get total queries answered
    pub fn total_ops(&self) -> u64 {
        self.total_ops.load(Ordering::Relaxed)
    }

    /// Get queries that returned an error
    pub fn failed_ops(&self) -> u64 {
        self.failed_ops.load(Ordering::Relaxed)
    }

    /// Get queries by route
    pub fn ops_by_route(&self) -> HashMap<String, u64> {
        self.ops_by_route.read().clone()
    }

    /// Average latency in microseconds
    pub fn avg_latency_us(&self) -> f64 {
        let count = self.total_ops();
        if count == 0 {
            return 0.0;
        }
        self.latency_sum_us.load(Ordering::Relaxed) as f64 / count as f64
    }

    /// Get min latency in microseconds
    pub fn min_latency_us(&self) -> u64 {
        match self.latency_min_us.load(Ordering::Relaxed) {
            u64::MAX => 0,
            min => min,
        }
    }

    /// Get max latency in microseconds
    pub fn max_latency_us(&self) -> u64 {
        self.latency_max_us.load(Ordering::Relaxed)
    }

    /// One-line summary for logging
    pub fn summary(&self) -> String {
        format!(
            "Queries: {} ({} failed) | Latency (µs): avg={:.1}, min={}, max={}",
            self.total_ops(),
            self.failed_ops(),
            self.avg_latency_us(),
            self.min_latency_us(),
            self.max_latency_us()
        )
    }
}
