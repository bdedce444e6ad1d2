//! Shared counters for the /health endpoint. Updated by every chart handler.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub struct HealthState {
    started_at: Instant,
    /// Build requests answered (empty results included).
    requests_served: AtomicU64,
    /// Requests whose input produced no chart.
    empty_results: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            requests_served: AtomicU64::new(0),
            empty_results: AtomicU64::new(0),
        }
    }

    pub fn record_request(&self, produced_output: bool) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
        if !produced_output {
            self.empty_results.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn requests_served(&self) -> u64 {
        self.requests_served.load(Ordering::Relaxed)
    }

    pub fn empty_results(&self) -> u64 {
        self.empty_results.load(Ordering::Relaxed)
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}
