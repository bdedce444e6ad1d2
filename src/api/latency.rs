//! Build-latency histograms, one for the whole service and one per endpoint.
//! Handlers record after every build; `/stats/latency` and `/health` read.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use hdrhistogram::Histogram;

const MIN_US: u64 = 1;
const MAX_US: u64 = 100_000_000;

/// Percentiles in microseconds over `count` samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Percentiles {
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub count: u64,
}

impl Percentiles {
    fn of(h: &Histogram<u64>) -> Option<Self> {
        if h.is_empty() {
            return None;
        }
        Some(Self {
            p50_us: h.value_at_quantile(0.5),
            p95_us: h.value_at_quantile(0.95),
            p99_us: h.value_at_quantile(0.99),
            count: h.len(),
        })
    }
}

struct Histograms {
    overall: Histogram<u64>,
    by_endpoint: BTreeMap<&'static str, Histogram<u64>>,
}

pub struct LatencyStats {
    inner: Mutex<Histograms>,
}

impl LatencyStats {
    /// Tracks 1us to 100s, 3 significant figures.
    pub fn new() -> Self {
        let overall =
            Histogram::new_with_bounds(MIN_US, MAX_US, 3).expect("valid histogram bounds");
        Self {
            inner: Mutex::new(Histograms {
                overall,
                by_endpoint: BTreeMap::new(),
            }),
        }
    }

    /// Out-of-range samples saturate to the tracked bounds.
    pub fn record(&self, endpoint: &'static str, d: Duration) {
        let us = u64::try_from(d.as_micros())
            .unwrap_or(u64::MAX)
            .clamp(MIN_US, MAX_US);
        let Ok(mut guard) = self.inner.lock() else {
            return;
        };
        let Histograms {
            overall,
            by_endpoint,
        } = &mut *guard;
        let _ = overall.record(us);
        let _ = by_endpoint
            .entry(endpoint)
            .or_insert_with(|| Histogram::new_from(&*overall))
            .record(us);
    }

    /// Service-wide percentiles. None if no samples.
    pub fn overall(&self) -> Option<Percentiles> {
        self.inner
            .lock()
            .ok()
            .and_then(|h| Percentiles::of(&h.overall))
    }

    /// Percentiles for every endpoint that has recorded at least one build.
    pub fn by_endpoint(&self) -> BTreeMap<&'static str, Percentiles> {
        let Ok(h) = self.inner.lock() else {
            return BTreeMap::new();
        };
        h.by_endpoint
            .iter()
            .filter_map(|(endpoint, hist)| Percentiles::of(hist).map(|p| (*endpoint, p)))
            .collect()
    }

    pub fn len(&self) -> u64 {
        self.inner.lock().map(|h| h.overall.len()).unwrap_or(0)
    }
}

impl Default for LatencyStats {
    fn default() -> Self {
        Self::new()
    }
}
