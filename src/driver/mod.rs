//! Workload dispatch: admission control, operation mix, key
//! coordination, and drain-before-report.
//!
//! The driver owns a semaphore of `concurrency` permits as the sole
//! admission mechanism: the dispatch loop blocks on a permit when the
//! budget is exhausted and every operation holds its permit to
//! completion. There is no queue beyond the blocked loop. After the
//! deadline (or cancellation) the driver stops dispatching and joins
//! every in-flight operation before handing the recorders back.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

pub mod keyset;
pub use keyset::{KeyExistenceSet, WriteKind};

use crate::adapter::BackendAdapter;
use crate::error::HarnessError;
use crate::metrics::{LatencyRecorder, ProgressHook};

/// Completed operations between progress log lines.
const PROGRESS_INTERVAL: u64 = 1000;

/// Parameters of one run. Immutable once the run starts.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Wall-clock run length; zero means run until cancelled.
    pub run_for: Duration,
    /// Maximum operations in flight at once.
    pub concurrency: usize,
    /// Keys are sampled uniformly from `[0, key_space)`.
    pub key_space: u64,
    /// Probability in `[0, 1]` that an operation is a write.
    pub write_ratio: f64,
    /// Fixed RNG seed for reproducible key/op sequences.
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            run_for: Duration::from_secs(5),
            concurrency: 100,
            key_space: 100,
            write_ratio: 0.5,
            seed: None,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.concurrency == 0 {
            return Err(HarnessError::InvalidConfig(
                "concurrency must be greater than zero".into(),
            ));
        }
        if self.key_space == 0 {
            return Err(HarnessError::InvalidConfig(
                "key space must be greater than zero".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.write_ratio) {
            return Err(HarnessError::InvalidConfig(format!(
                "write ratio must be within [0, 1], got {}",
                self.write_ratio
            )));
        }
        Ok(())
    }
}

/// Recorders for one finished run, one per operation class. Handed out
/// only after every dispatched operation has completed.
pub struct RunStats {
    pub reads: Arc<LatencyRecorder>,
    pub writes: Arc<LatencyRecorder>,
}

/// Drives one workload run against a backend adapter.
pub struct WorkloadDriver {
    config: RunConfig,
    cancel: CancellationToken,
}

impl WorkloadDriver {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Token that stops dispatch when cancelled. In-flight operations
    /// still run to completion; there is no forced abort.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the workload until the deadline elapses (or the token is
    /// cancelled, for unbounded runs), then drain and return both
    /// recorders.
    ///
    /// Fails only on invalid configuration, before anything is
    /// dispatched. Backend errors are recorded as failed tries and
    /// never abort the run.
    pub async fn run(&self, adapter: Arc<dyn BackendAdapter>) -> Result<RunStats, HarnessError> {
        self.config.validate()?;

        let hook: ProgressHook = {
            let completed = Arc::new(AtomicU64::new(0));
            Arc::new(move || {
                let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if n % PROGRESS_INTERVAL == 0 {
                    tracing::info!(completed = n, "progress");
                }
            })
        };
        let reads = Arc::new(LatencyRecorder::with_hook(hook.clone()));
        let writes = Arc::new(LatencyRecorder::with_hook(hook));
        let keys = Arc::new(KeyExistenceSet::new());

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let deadline = (self.config.run_for > Duration::ZERO)
            .then(|| Instant::now() + self.config.run_for);
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut tasks = JoinSet::new();

        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    break;
                }
            }

            // Backpressure: block here until a worker frees a slot.
            let permit = tokio::select! {
                _ = self.cancel.cancelled() => break,
                permit = semaphore.clone().acquire_owned() => {
                    let Ok(permit) = permit else { break };
                    permit
                }
            };

            let id = rng.gen_range(0..self.config.key_space);
            let is_write = rng.gen::<f64>() < self.config.write_ratio;

            let adapter = adapter.clone();
            let keys = keys.clone();
            let recorder = if is_write { writes.clone() } else { reads.clone() };

            tasks.spawn(async move {
                let _permit = permit;
                let (result, elapsed) = if is_write {
                    // Insert-vs-update is decided under the key set's
                    // lock; the backend call itself is not serialized.
                    let kind = keys.classify_write(id);
                    let started = Instant::now();
                    let result = match kind {
                        WriteKind::Insert => adapter.insert(id).await,
                        WriteKind::Update => adapter.update(id).await,
                    };
                    (result, started.elapsed())
                } else {
                    let started = Instant::now();
                    let result = adapter.read(id).await;
                    (result, started.elapsed())
                };

                if let Err(err) = &result {
                    tracing::debug!(id, error = %err, "operation failed");
                }
                recorder.record(result.is_ok(), elapsed);
            });
        }

        // Drain: every dispatched operation finishes before reporting.
        while tasks.join_next().await.is_some() {}

        Ok(RunStats { reads, writes })
    }
}
