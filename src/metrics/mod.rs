//! Latency recording and aggregation.
//!
//! One [`LatencyRecorder`] exists per operation class (reads, writes).
//! Many concurrent operations feed it through [`LatencyRecorder::record`];
//! the driver drains all in-flight work before anyone calls
//! [`LatencyRecorder::snapshot`], so aggregation never races recording.
//!
//! Failed operations still contribute their duration to the aggregate:
//! time-to-failure is part of the latency picture. Percentiles use
//! linear interpolation between order statistics (rank = p/100 * (n-1)),
//! not nearest rank.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;

pub mod reporter;
pub use reporter::SummaryPrinter;

/// Callback invoked after every recorded operation, across all classes.
/// The driver uses it for periodic progress logging.
pub type ProgressHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Counters {
    tries: u64,
    successes: u64,
    durations: Vec<Duration>,
}

/// Thread-safe accumulator of per-operation outcomes for one class.
///
/// Invariant after every completed `record`:
/// `successes <= tries == durations.len()`.
pub struct LatencyRecorder {
    inner: Mutex<Counters>,
    on_record: Option<ProgressHook>,
}

impl LatencyRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Counters::default()),
            on_record: None,
        }
    }

    /// Recorder that invokes `hook` after each record, outside the lock.
    pub fn with_hook(hook: ProgressHook) -> Self {
        Self {
            inner: Mutex::new(Counters::default()),
            on_record: Some(hook),
        }
    }

    /// Record one operation outcome. Callable concurrently from any
    /// number of tasks; the try/success/duration update is a single
    /// critical section so counts never drift apart.
    pub fn record(&self, success: bool, duration: Duration) {
        {
            let mut inner = self.inner.lock();
            inner.tries += 1;
            if success {
                inner.successes += 1;
            }
            inner.durations.push(duration);
        }
        if let Some(hook) = &self.on_record {
            hook();
        }
    }

    /// Aggregate everything recorded so far. Meant to be called after
    /// the driver has drained all workers.
    pub fn snapshot(&self) -> AggregateReport {
        let inner = self.inner.lock();
        AggregateReport {
            tries: inner.tries,
            successes: inner.successes,
            latency: LatencyStats::from_samples(&inner.durations),
        }
    }
}

impl Default for LatencyRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view over one class of operations.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub tries: u64,
    pub successes: u64,
    /// `None` when no operations were recorded; never a zero/NaN stand-in.
    pub latency: Option<LatencyStats>,
}

impl AggregateReport {
    pub fn failures(&self) -> u64 {
        self.tries - self.successes
    }

    pub fn failure_rate(&self) -> f64 {
        if self.tries == 0 {
            0.0
        } else {
            self.failures() as f64 / self.tries as f64
        }
    }
}

/// Latency distribution of one class, durations ordered by rank.
#[derive(Debug, Clone, Serialize)]
pub struct LatencyStats {
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
    pub median: Duration,
    pub p25: Duration,
    pub p75: Duration,
    pub p95: Duration,
    pub p99: Duration,
}

impl LatencyStats {
    /// Compute the distribution over raw samples; `None` on zero samples.
    pub fn from_samples(samples: &[Duration]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut ns: Vec<f64> = samples.iter().map(|d| d.as_secs_f64() * 1e9).collect();
        ns.sort_by(|a, b| a.total_cmp(b));

        let mean = ns.iter().sum::<f64>() / ns.len() as f64;
        let from_ns = |v: f64| Duration::from_secs_f64(v / 1e9);

        Some(Self {
            min: from_ns(ns[0]),
            max: from_ns(ns[ns.len() - 1]),
            mean: from_ns(mean),
            median: from_ns(percentile_sorted(&ns, 50.0)?),
            p25: from_ns(percentile_sorted(&ns, 25.0)?),
            p75: from_ns(percentile_sorted(&ns, 75.0)?),
            p95: from_ns(percentile_sorted(&ns, 95.0)?),
            p99: from_ns(percentile_sorted(&ns, 99.0)?),
        })
    }
}

/// Linear-interpolation percentile over an ascending-sorted sample set.
///
/// rank = pct/100 * (n-1); fractional ranks interpolate between the two
/// neighboring order statistics. Returns `None` on an empty slice.
pub fn percentile_sorted(sorted: &[f64], pct: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    debug_assert!((0.0..=100.0).contains(&pct));
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}
